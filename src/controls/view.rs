//! Plain-text rendering of the current page.

use super::{RowProps, TableControls};
use crate::expansion::ExpansionVariant;
use crate::selection::BulkSelectState;
use crate::sort::SortDirection;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const SEPARATOR: &str = " | ";
const CHECKED: &str = "■";
const UNCHECKED: &str = "□";
const INDETERMINATE: &str = "▣";
const EXPANDED: &str = "▾";
const COLLAPSED: &str = "▸";

/// Pads or truncates `text` to exactly `width` terminal cells.
fn fit(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width <= width {
        return format!("{text}{}", " ".repeat(width - text_width));
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

fn render_line(lead: &[&str], cells: &[String], widths: &[usize]) -> String {
    let parts: Vec<String> = lead
        .iter()
        .map(|s| s.to_string())
        .chain(cells.iter().zip(widths).map(|(cell, width)| fit(cell, *width)))
        .collect();
    parts.join(SEPARATOR).trim_end().to_string()
}

impl<T> TableControls<T> {
    /// Renders the header, the rows of the current page and a status line.
    ///
    /// Rows are prefixed with `> ` when they are the active item. Selection
    /// and single-expansion toggles are rendered as leading columns.
    pub fn view(&self) -> String {
        let view = self.derived();
        let columns = self.definition.columns();
        let selection = self.is_selection_enabled();
        let single = self.single_expansion();
        let compound = self
            .expansion_state
            .as_ref()
            .is_some_and(|e| e.variant() == ExpansionVariant::Compound);

        let header_labels: Vec<String> = self
            .header_cells()
            .iter()
            .map(|header| match header.sort_direction {
                Some(SortDirection::Asc) => format!("{} ▲", header.title),
                Some(SortDirection::Desc) => format!("{} ▼", header.title),
                None => header.title.to_string(),
            })
            .collect();

        let rows: Vec<(RowProps, Vec<String>)> = view
            .current_page_items
            .iter()
            .enumerate()
            .map(|(row_index, item)| {
                let props = self.row_props(item, row_index);
                let cells = columns
                    .iter()
                    .map(|column| {
                        let text = column.cell_text(item);
                        if !(compound && column.expandable) {
                            return text;
                        }
                        let expanded = self
                            .expansion_state
                            .as_ref()
                            .is_some_and(|e| e.is_cell_expanded(props.item_id.as_str(), Some(column.key.as_str())));
                        format!("{} {text}", if expanded { EXPANDED } else { COLLAPSED })
                    })
                    .collect();
                (props, cells)
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                column.width.unwrap_or_else(|| {
                    rows.iter()
                        .filter_map(|(_, cells)| cells.get(i))
                        .map(|cell| cell.width())
                        .chain(header_labels.get(i).map(|label| label.width()))
                        .max()
                        .unwrap_or(0)
                })
            })
            .collect();

        let mut lines = Vec::new();

        let (bulk_state, selected) = self.selection_summary();
        let mut header_lead = Vec::new();
        if selection {
            header_lead.push(match bulk_state {
                BulkSelectState::Checked => CHECKED,
                BulkSelectState::Unchecked => UNCHECKED,
                BulkSelectState::Indeterminate => INDETERMINATE,
            });
        }
        if single {
            header_lead.push(" ");
        }
        lines.push(format!("  {}", render_line(&header_lead, &header_labels, &widths)));

        let rule: Vec<String> = header_lead
            .iter()
            .map(|_| "-".to_string())
            .chain(widths.iter().map(|w| "-".repeat(*w)))
            .collect();
        lines.push(format!("  {}", rule.join("-+-")));

        for (props, cells) in &rows {
            let mut lead = Vec::new();
            if selection {
                lead.push(if props.is_selected { CHECKED } else { UNCHECKED });
            }
            if single {
                lead.push(if props.is_expanded { EXPANDED } else { COLLAPSED });
            }
            let prefix = if props.is_active { "> " } else { "  " };
            lines.push(format!("{prefix}{}", render_line(&lead, cells, &widths)));
        }

        if let Some(error) = &self.fetch_error {
            lines.push(format!("  Error: {error}"));
        } else if rows.is_empty() {
            lines.push(if self.is_loading { "  Loading..." } else { "  No items" }.to_string());
        }

        if self.is_pagination_enabled() {
            lines.push(format!(
                "  {}",
                self.pagination_view.render(&self.pagination_state, view.total_item_count)
            ));
        }
        if selection && selected > 0 {
            lines.push(format!("  {selected} selected"));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{Column, DataSource, TableAction, TableControlsConfig, TableDefinition};
    use crate::value::SortValue;

    #[derive(Debug, Clone)]
    struct Row {
        id: u32,
        name: &'static str,
    }

    fn rows() -> Vec<Row> {
        vec![Row { id: 1, name: "alpha" }, Row { id: 2, name: "bravissimo" }]
    }

    #[test]
    fn test_fit_pads_and_truncates() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("abc", 0), "");
        // Wide characters take two cells.
        assert_eq!(fit("日本語", 4), "日… ");
    }

    #[test]
    fn test_sorted_local_view() {
        let definition = TableDefinition::new(|row: &Row| row.id)
            .with_column(Column::new("name", "Name").sortable().with_cell(|row: &Row| row.name.to_string()))
            .with_sort_value(|row: &Row, _: &str| Some(SortValue::from(row.name)));
        let mut table = TableControls::new(TableControlsConfig::local("t"), definition).unwrap();
        table.set_data(DataSource::Local(vec![
            Row { id: 2, name: "beta" },
            Row { id: 1, name: "alpha" },
        ]));
        table.update(TableAction::ToggleSort("name".into())).unwrap();

        assert_eq!(table.view(), "  Name ▲\n  ------\n  alpha\n  beta\n  1/1");
    }

    #[test]
    fn test_selection_column_and_truncation() {
        let definition = TableDefinition::new(|row: &Row| row.id)
            .with_column(Column::new("id", "Id").with_width(2).with_cell(|row: &Row| row.id.to_string()))
            .with_column(Column::new("name", "Name").with_width(5).with_cell(|row: &Row| row.name.to_string()));
        let mut table = TableControls::new(TableControlsConfig::new("t").with_selection(true), definition).unwrap();
        table.set_data(DataSource::Local(rows()));
        table.update(TableAction::ToggleSelection("2".into())).unwrap();

        assert_eq!(
            table.view(),
            "  ▣ | Id | Name\n  --+---+------\n  □ | 1  | alpha\n  ■ | 2  | brav…\n  1 selected"
        );
    }

    #[test]
    fn test_empty_and_error_states() {
        let definition = TableDefinition::new(|row: &Row| row.id)
            .with_column(Column::new("name", "Name").with_cell(|row: &Row| row.name.to_string()));
        let mut table = TableControls::new(TableControlsConfig::new("t"), definition).unwrap();
        assert_eq!(table.view(), "  Name\n  ----\n  No items");

        table.set_loading(true);
        assert_eq!(table.view(), "  Name\n  ----\n  Loading...");

        table.set_fetch_error(Some("boom".into()));
        assert_eq!(table.view(), "  Name\n  ----\n  Error: boom");
    }

    #[test]
    fn test_active_row_marker() {
        let definition = TableDefinition::new(|row: &Row| row.id)
            .with_column(Column::new("name", "Name").with_cell(|row: &Row| row.name.to_string()));
        let mut table =
            TableControls::new(TableControlsConfig::new("t").with_active_item(true), definition).unwrap();
        table.set_data(DataSource::Local(rows()));
        table.update(TableAction::SetActiveItem("1".into())).unwrap();

        let view = table.view();
        assert!(view.contains("> alpha"));
        assert!(view.contains("  bravissimo"));
    }
}
