//! Plain-text table rendering for listing commands.

/// Renders rows under a header line, columns padded to the widest cell and
/// separated by two spaces.
pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
	let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
	for row in rows {
		for (i, cell) in row.iter().enumerate() {
			widths[i] = widths[i].max(cell.len());
		}
	}

	let mut out = String::new();
	render_row(&mut out, headers.iter().map(|h| h.to_string()), &widths);
	for row in rows {
		render_row(&mut out, row.iter().cloned(), &widths);
	}
	out
}

fn render_row(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
	let cells: Vec<String> = cells.collect();
	let last = cells.len().saturating_sub(1);
	for (i, cell) in cells.iter().enumerate() {
		if i < last {
			out.push_str(&format!("{:<width$}  ", cell, width = widths[i]));
		} else {
			out.push_str(cell);
		}
	}
	out.push('\n');
}
