// Referendum - Solidity build and contract-handle toolkit
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Rendering of compiler diagnostics
//! Turns solc errors into a readable report with the offending source lines.

use foundry_compilers::artifacts::Error as CompilerDiagnostic;

/// Lines of context printed around a primary error location.
const CONTEXT_LINES: usize = 2;

/// Extract code context around a byte range of `source`
fn extract_code_context(
    source: &str,
    start_pos: i32,
    end_pos: i32,
    context_lines: usize,
) -> Option<String> {
    if start_pos < 0 || end_pos < start_pos || end_pos as usize > source.len() {
        return None;
    }

    let (start_pos, end_pos) = (start_pos as usize, end_pos as usize);
    let lines: Vec<&str> = source.lines().collect();

    // Byte offset of each line start, taken from the raw text so `\r\n` counts.
    let line_starts: Vec<usize> =
        std::iter::once(0).chain(source.match_indices('\n').map(|(i, _)| i + 1)).collect();
    let line_of = |pos: usize| line_starts.partition_point(|&start| start <= pos) - 1;

    let start_line = line_of(start_pos);
    let start_col = start_pos - line_starts[start_line];
    let end_line = if end_pos > start_pos { line_of(end_pos - 1) } else { start_line };
    let end_col = end_pos - line_starts[end_line];

    let mut context = String::new();
    let context_start = start_line.saturating_sub(context_lines);
    let context_end = (end_line + context_lines + 1).min(lines.len());

    for (line_num, line) in lines.iter().enumerate().take(context_end).skip(context_start) {
        let line_number = line_num + 1;
        context.push_str(&format!("  {line_number:>4} | {line}\n"));

        if line_num == start_line {
            let padding = format!("  {line_number:>4} | ").len();
            let underline_len = if start_line == end_line {
                end_col.saturating_sub(start_col).max(1)
            } else {
                line.len().saturating_sub(start_col).max(1)
            };
            context.push_str(&" ".repeat(padding + start_col));
            context.push_str(&"^".repeat(underline_len));
            context.push('\n');
        }
    }

    Some(context)
}

/// Format compiler errors with source location information
///
/// Only diagnostics with error severity are included. Locations pointing into
/// `source_name` are expanded with a numbered excerpt of `source`.
pub fn format_compiler_errors(
    errors: &[CompilerDiagnostic],
    source_name: &str,
    source: &str,
) -> String {
    let mut formatted = String::new();

    for error in errors.iter().filter(|e| e.is_error()) {
        formatted.push_str("\n\n");

        if let Some(error_code) = &error.error_code {
            formatted.push_str(&format!("Error [{error_code}]: "));
        } else {
            formatted.push_str("Error: ");
        }
        formatted.push_str(&error.message);

        if let Some(loc) = &error.source_location {
            formatted.push_str(&format!("\n  --> {}:{}:{}", loc.file, loc.start, loc.end));

            if loc.file == source_name {
                let context = extract_code_context(source, loc.start, loc.end, CONTEXT_LINES);
                if let Some(context) = context {
                    formatted.push_str("\n\n");
                    formatted.push_str(&context);
                }
            }
        }

        for sec_loc in &error.secondary_source_locations {
            if let Some(msg) = &sec_loc.message {
                formatted.push_str(&format!("\n  Note: {msg}"));
            }
            if let Some(file) = &sec_loc.file {
                formatted.push_str(&format!(
                    "\n    --> {}:{}:{}",
                    file,
                    sec_loc.start.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string()),
                    sec_loc.end.map(|e| e.to_string()).unwrap_or_else(|| "?".to_string())
                ));
            }
        }
    }

    if formatted.is_empty() {
        formatted.push_str("\nNo specific error details available");
    }

    formatted
}
