use std::cmp::Ordering;
use tracing::{debug, warn};

/// Fallback rows per page when nothing else decides it.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Lines the table screen draws around the rows: filter, two borders, header, page and hint.
pub const SCREEN_CHROME_LINES: usize = 6;

/// Where the page size came from, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct PageSizeSources {
    pub explicit: Option<usize>,
    pub env_limit: Option<String>,
    pub config: Option<usize>,
    pub env_lines: Option<String>,
}

impl PageSizeSources {
    /// Read `XTUI_PAGE_SIZE_LIMIT` and `LINES` from the process environment.
    pub fn from_env(explicit: Option<usize>, config: Option<usize>) -> Self {
        Self {
            explicit,
            env_limit: std::env::var("XTUI_PAGE_SIZE_LIMIT").ok(),
            config,
            env_lines: std::env::var("LINES").ok(),
        }
    }

    /// True when nothing pins the page size, so it may track the terminal height.
    pub fn follows_terminal(&self) -> bool {
        self.explicit.is_none()
            && self.config.is_none()
            && self
                .env_limit
                .as_deref()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .is_none()
    }

    pub fn resolve(&self) -> usize {
        let parse = |raw: &Option<String>| raw.as_deref().and_then(|v| v.trim().parse::<usize>().ok());

        let size = self
            .explicit
            .or_else(|| parse(&self.env_limit))
            .or(self.config)
            .or_else(|| parse(&self.env_lines).map(|lines| lines.saturating_sub(SCREEN_CHROME_LINES)))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        size.max(1)
    }
}

/// Filter, sort, pagination and selection state over a fixed row set.
///
/// Every change re-runs the pipeline in a fixed order: filter, then sort,
/// then clamp page and selection against the filtered order.
#[derive(Debug, Clone)]
pub struct TableView {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    filter: String,
    /// Indices into `rows`, post-filter and post-sort
    filtered: Vec<usize>,
    sort_column: Option<usize>,
    ascending: bool,
    page: usize,
    page_size: usize,
    selected: Option<usize>,
    visible: Vec<bool>,
    show_help: bool,
}

impl TableView {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, page_size: usize) -> Self {
        let width = headers.len();
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .enumerate()
            .map(|(i, mut row)| {
                if row.len() != width {
                    warn!(row = i, cells = row.len(), headers = width, "Row width does not match headers");
                    row.resize(width, String::new());
                }
                row
            })
            .collect();

        let mut view = Self {
            visible: vec![true; width],
            filtered: Vec::new(),
            headers,
            rows,
            filter: String::new(),
            sort_column: None,
            ascending: true,
            page: 0,
            page_size: page_size.max(1),
            selected: None,
            show_help: false,
        };
        view.refresh();
        view
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn sort_column(&self) -> Option<usize> {
        self.sort_column
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn visibility(&self) -> &[bool] {
        &self.visible
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// `max(1, ceil(N / P))`
    pub fn page_count(&self) -> usize {
        self.filtered.len().div_ceil(self.page_size).max(1)
    }

    pub fn filtered_rows(&self) -> Vec<&[String]> {
        self.filtered.iter().map(|&i| self.rows[i].as_slice()).collect()
    }

    /// Rows `[p*P, min((p+1)*P, N))` of the filtered order.
    pub fn current_page_rows(&self) -> Vec<&[String]> {
        let start = (self.page * self.page_size).min(self.filtered.len());
        let end = (start + self.page_size).min(self.filtered.len());
        self.filtered[start..end]
            .iter()
            .map(|&i| self.rows[i].as_slice())
            .collect()
    }

    /// Index of the first row on the current page within the filtered order.
    pub fn page_offset(&self) -> usize {
        self.page * self.page_size
    }

    pub fn selected_row(&self) -> Option<&[String]> {
        self.selected
            .and_then(|s| self.filtered.get(s))
            .map(|&i| self.rows[i].as_slice())
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter.push(c);
        self.refresh();
    }

    pub fn pop_filter_char(&mut self) {
        if self.filter.pop().is_some() {
            self.refresh();
        }
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.refresh();
    }

    /// Recompute the filtered set from the current filter text.
    pub fn apply_filter(&mut self) {
        self.refresh();
    }

    /// Advance to the next column and flip the direction.
    pub fn toggle_sort(&mut self) {
        let n = self.headers.len();
        if n == 0 {
            return;
        }
        self.sort_column = Some(match self.sort_column {
            Some(column) => (column + 1) % n,
            None => 0,
        });
        self.ascending = !self.ascending;
        debug!(column = ?self.sort_column, ascending = self.ascending, "Table sort changed");
        self.refresh();
    }

    pub fn sort_by(&mut self, column: usize, ascending: bool) {
        if column < self.headers.len() {
            self.sort_column = Some(column);
            self.ascending = ascending;
            self.refresh();
        }
    }

    pub fn next_page(&mut self) -> bool {
        if (self.page + 1) * self.page_size < self.filtered.len() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page` only if it is reachable.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page == 0 || page * self.page_size < self.filtered.len() {
            self.page = page;
            true
        } else {
            false
        }
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.clamp();
        self.follow_selection();
    }

    pub fn select_next(&mut self) {
        self.move_selection(1);
    }

    pub fn select_prev(&mut self) {
        self.move_selection(-1);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Flip every column at once.
    pub fn toggle_columns(&mut self) {
        for flag in &mut self.visible {
            *flag = !*flag;
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Header indices currently shown.
    pub fn visible_columns(&self) -> Vec<usize> {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| v.then_some(i))
            .collect()
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.filtered.len();
        if len == 0 {
            self.selected = None;
            return;
        }
        let next = match self.selected {
            None => 0,
            Some(current) => current.saturating_add_signed(delta).min(len - 1),
        };
        self.selected = Some(next);
        self.follow_selection();
    }

    fn follow_selection(&mut self) {
        if let Some(selected) = self.selected {
            self.page = selected / self.page_size;
        }
    }

    fn refresh(&mut self) {
        let needle = self.filter.to_lowercase();
        self.filtered = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| needle.is_empty() || row.iter().any(|cell| cell.to_lowercase().contains(&needle)))
            .map(|(i, _)| i)
            .collect();

        if let Some(column) = self.sort_column {
            let rows = &self.rows;
            let ascending = self.ascending;
            self.filtered
                .sort_by(|&a, &b| compare_cells(&rows[a][column], &rows[b][column], ascending));
        }

        self.clamp();
    }

    fn clamp(&mut self) {
        let len = self.filtered.len();
        let last_page = self.page_count() - 1;
        if self.page > last_page {
            self.page = last_page;
        }
        self.selected = match self.selected {
            Some(_) if len == 0 => None,
            Some(s) => Some(s.min(len - 1)),
            None => None,
        };
    }
}

fn compare_cells(a: &str, b: &str, ascending: bool) -> Ordering {
    if ascending {
        a.cmp(b)
    } else {
        b.cmp(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn packages() -> TableView {
        TableView::new(
            strings(&["Name", "Status"]),
            vec![strings(&["nginx", "installed"]), strings(&["curl", "residual"])],
            20,
        )
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let mut view = packages();
        view.set_filter("RESID");
        assert_eq!(view.filtered_rows(), vec![strings(&["curl", "residual"]).as_slice()]);
    }

    #[test]
    fn test_single_row_sort_is_unchanged() {
        let mut view = packages();
        view.set_filter("resid");
        view.sort_by(0, true);
        assert_eq!(view.filtered_rows()[0], strings(&["curl", "residual"]).as_slice());
        view.sort_by(0, false);
        assert_eq!(view.filtered_rows()[0], strings(&["curl", "residual"]).as_slice());
    }

    #[test]
    fn test_backspace_on_empty_filter_is_noop() {
        let mut view = packages();
        view.pop_filter_char();
        assert_eq!(view.filter(), "");
        assert_eq!(view.filtered_len(), 2);
    }

    #[test]
    fn test_toggle_sort_cycles_columns_and_flips_direction() {
        let mut view = packages();
        assert_eq!(view.sort_column(), None);
        view.toggle_sort();
        assert_eq!(view.sort_column(), Some(0));
        assert!(!view.is_ascending());
        assert_eq!(view.filtered_rows()[0][0], "nginx");
        view.toggle_sort();
        assert_eq!(view.sort_column(), Some(1));
        assert!(view.is_ascending());
        view.toggle_sort();
        assert_eq!(view.sort_column(), Some(0));
    }

    #[test]
    fn test_toggle_sort_without_headers_is_noop() {
        let mut view = TableView::new(Vec::new(), Vec::new(), 5);
        view.toggle_sort();
        assert_eq!(view.sort_column(), None);
    }

    #[test]
    fn test_page_size_one_navigation() {
        let mut view = TableView::new(
            strings(&["N"]),
            vec![strings(&["a"]), strings(&["b"]), strings(&["c"])],
            1,
        );
        assert!(view.go_to_page(2));
        assert_eq!(view.current_page_rows(), vec![strings(&["c"]).as_slice()]);
        assert!(!view.go_to_page(3));
        assert!(!view.next_page());
        assert_eq!(view.page(), 2);
        assert_eq!(view.page_count(), 3);
    }

    #[test]
    fn test_empty_set_has_one_page() {
        let mut view = packages();
        view.set_filter("zzz");
        assert_eq!(view.page_count(), 1);
        assert!(view.current_page_rows().is_empty());
        view.select_next();
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn test_selection_clamps_and_page_follows() {
        let rows = (0..5).map(|i| vec![i.to_string()]).collect();
        let mut view = TableView::new(strings(&["N"]), rows, 2);
        view.select_prev();
        assert_eq!(view.selected(), Some(0));
        for _ in 0..10 {
            view.select_next();
        }
        assert_eq!(view.selected(), Some(4));
        assert_eq!(view.page(), 2);
        view.clear_selection();
        assert_eq!(view.page(), 2);
        assert_eq!(view.selected_row(), None);
    }

    #[test]
    fn test_filter_shrink_clamps_page_and_selection() {
        let rows = (0..10).map(|i| vec![format!("row{}", i)]).collect();
        let mut view = TableView::new(strings(&["N"]), rows, 3);
        for _ in 0..9 {
            view.select_next();
        }
        assert_eq!(view.selected(), Some(8));
        assert_eq!(view.page(), 2);
        view.set_filter("row1");
        assert_eq!(view.filtered_len(), 1);
        assert_eq!(view.page(), 0);
        assert_eq!(view.selected(), Some(0));
    }

    #[test]
    fn test_column_toggle_is_all_at_once() {
        let mut view = packages();
        view.toggle_columns();
        assert_eq!(view.visibility(), &[false, false]);
        assert!(view.visible_columns().is_empty());
        view.toggle_columns();
        assert_eq!(view.visible_columns(), vec![0, 1]);
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let view = TableView::new(strings(&["A", "B"]), vec![strings(&["only"])], 5);
        assert_eq!(view.filtered_rows()[0], strings(&["only", ""]).as_slice());
    }

    #[test]
    fn test_page_size_resolution_order() {
        let sources = PageSizeSources {
            explicit: None,
            env_limit: Some("7".into()),
            config: Some(12),
            env_lines: Some("40".into()),
        };
        assert_eq!(sources.resolve(), 7);

        let sources = PageSizeSources {
            env_limit: Some("not a number".into()),
            ..sources
        };
        assert_eq!(sources.resolve(), 12);

        let sources = PageSizeSources {
            config: None,
            ..sources
        };
        assert_eq!(sources.resolve(), 40 - SCREEN_CHROME_LINES);

        assert_eq!(PageSizeSources::default().resolve(), DEFAULT_PAGE_SIZE);
        let zero = PageSizeSources {
            explicit: Some(0),
            ..PageSizeSources::default()
        };
        assert_eq!(zero.resolve(), 1);
    }

    #[test]
    fn test_follows_terminal_only_when_unpinned() {
        let lines_only = PageSizeSources {
            env_lines: Some("40".into()),
            env_limit: Some("junk".into()),
            ..PageSizeSources::default()
        };
        assert!(lines_only.follows_terminal());

        let pinned = PageSizeSources {
            config: Some(5),
            ..PageSizeSources::default()
        };
        assert!(!pinned.follows_terminal());
    }
}
