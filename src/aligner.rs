use crate::settings::SheetPolicy;
use crate::workbook::{Grid, SheetEntry, Workbook};

/// One template sheet scheduled for comparison. `output` is `None` when the
/// sheet does not exist in the output workbook.
#[derive(Debug)]
pub struct SheetPair<'a> {
    pub name: &'a str,
    pub template: &'a SheetEntry,
    pub output: Option<&'a SheetEntry>,
}

/// Pick the sheets to compare, in template order.
pub fn align_sheets<'a>(
    template: &'a Workbook,
    output: &'a Workbook,
    policy: SheetPolicy,
) -> Vec<SheetPair<'a>> {
    template
        .sheets()
        .iter()
        .filter_map(|entry| {
            let counterpart = output.sheet(&entry.name);
            match (policy, counterpart) {
                (SheetPolicy::Intersection, None) => None,
                _ => Some(SheetPair {
                    name: entry.name.as_str(),
                    template: entry,
                    output: counterpart,
                }),
            }
        })
        .collect()
}

/// Column-major walk over `first_row..=last_row` × `1..=last_col`,
/// yielding 1-based `(row, col)`. Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct Coordinates {
    first_row: u32,
    last_row: u32,
    last_col: u32,
    row: u32,
    col: u32,
}

impl Coordinates {
    pub fn new(first_row: u32, last_row: u32, last_col: u32) -> Self {
        Self { first_row, last_row, last_col, row: first_row, col: 1 }
    }

    /// The scan range for a template sheet.
    pub fn for_template(grid: &Grid, header_row: u32) -> Self {
        Self::new(header_row, grid.max_row(), grid.max_col())
    }
}

impl Iterator for Coordinates {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.first_row > self.last_row || self.col > self.last_col {
            return None;
        }
        let item = (self.row, self.col);
        if self.row >= self.last_row {
            self.row = self.first_row;
            self.col += 1;
        } else {
            self.row += 1;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.first_row > self.last_row || self.col > self.last_col {
            return (0, Some(0));
        }
        let rows = (self.last_row - self.first_row + 1) as usize;
        let full_cols = (self.last_col - self.col) as usize;
        let remaining = full_cols * rows + (self.last_row - self.row + 1) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Coordinates {}

/// Field labels taken from the template header row.
#[derive(Debug, Clone)]
pub struct ColumnLabels {
    labels: Vec<String>,
}

impl ColumnLabels {
    pub fn from_grid(grid: &Grid, header_row: u32) -> Self {
        let labels = (1..=grid.max_col())
            .map(|col| {
                let header = grid.value(header_row, col);
                if header.is_blank() {
                    format!("Col_{col}")
                } else {
                    header.to_string()
                }
            })
            .collect();
        Self { labels }
    }

    pub fn label(&self, col: u32) -> String {
        col.checked_sub(1)
            .and_then(|i| self.labels.get(i as usize))
            .cloned()
            .unwrap_or_else(|| format!("Col_{col}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    fn book(names: &[&str]) -> Workbook {
        let mut wb = Workbook::new();
        for n in names {
            wb.add_sheet(n, Grid::new());
        }
        wb
    }

    #[test]
    fn test_template_policy_keeps_missing_sheets() {
        let t = book(&["A", "B", "C"]);
        let o = book(&["C", "A", "Z"]);
        let pairs = align_sheets(&t, &o, SheetPolicy::Template);
        let names: Vec<_> = pairs.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(pairs[0].output.is_some());
        assert!(pairs[1].output.is_none());
    }

    #[test]
    fn test_intersection_policy_drops_unique_sheets() {
        let t = book(&["A", "B", "C"]);
        let o = book(&["C", "A", "Z"]);
        let names: Vec<_> = align_sheets(&t, &o, SheetPolicy::Intersection)
            .iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_coordinates_column_major() {
        let coords: Vec<_> = Coordinates::new(3, 5, 2).collect();
        assert_eq!(coords, vec![(3, 1), (4, 1), (5, 1), (3, 2), (4, 2), (5, 2)]);
    }

    #[test]
    fn test_coordinates_empty_ranges() {
        assert_eq!(Coordinates::new(3, 2, 4).count(), 0);
        assert_eq!(Coordinates::new(3, 9, 0).count(), 0);
        assert_eq!(Coordinates::new(3, 3, 1).collect::<Vec<_>>(), vec![(3, 1)]);
    }

    #[test]
    fn test_coordinates_restartable_and_sized() {
        let mut coords = Coordinates::new(3, 4, 3);
        assert_eq!(coords.len(), 6);
        coords.next();
        let snapshot = coords.clone();
        assert_eq!(coords.len(), 5);
        let rest: Vec<_> = coords.collect();
        assert_eq!(snapshot.collect::<Vec<_>>(), rest);
        assert_eq!(rest.first(), Some(&(4, 1)));
    }

    #[test]
    fn test_coordinates_from_template_extents() {
        let mut g = Grid::new();
        g.set(3, 1, CellValue::String("ID".into()));
        g.set(6, 2, CellValue::Int(4));
        let coords = Coordinates::for_template(&g, 3);
        assert_eq!(coords.len(), 8);
    }

    #[test]
    fn test_column_labels() {
        let mut g = Grid::new();
        g.set(3, 1, CellValue::String("ID".into()));
        g.set(3, 2, CellValue::String("  ".into()));
        g.set(4, 3, CellValue::Float(1.5));
        let labels = ColumnLabels::from_grid(&g, 3);
        assert_eq!(labels.label(1), "ID");
        assert_eq!(labels.label(2), "Col_2");
        assert_eq!(labels.label(3), "Col_3");
        assert_eq!(labels.label(9), "Col_9");
    }
}
