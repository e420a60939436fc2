use proptest::prelude::*;
use xtui::TableView;

/// Property tests for the table engine
#[cfg(test)]
mod table_properties {
    use super::*;

    const HEADERS: [&str; 3] = ["Name", "Status", "Size"];

    fn headers() -> Vec<String> {
        HEADERS.iter().map(|h| h.to_string()).collect()
    }

    fn rows() -> impl Strategy<Value = Vec<Vec<String>>> {
        prop::collection::vec(prop::collection::vec("[a-c]{0,3}", HEADERS.len()), 0..40)
    }

    fn owned(rows: Vec<&[String]>) -> Vec<Vec<String>> {
        rows.into_iter().map(|r| r.to_vec()).collect()
    }

    proptest! {
        #[test]
        fn filter_is_idempotent(rows in rows(), filter in "[a-c]{1,2}") {
            let mut view = TableView::new(headers(), rows, 5);
            view.set_filter(filter.clone());
            let once = owned(view.filtered_rows());
            view.set_filter(filter);
            view.apply_filter();
            prop_assert_eq!(once, owned(view.filtered_rows()));
        }

        #[test]
        fn sort_is_stable(rows in rows(), column in 0usize..2, ascending in any::<bool>()) {
            // Tag each row with its original position in the last column
            let tagged: Vec<Vec<String>> = rows
                .into_iter()
                .enumerate()
                .map(|(i, mut row)| {
                    row[2] = format!("{:03}", i);
                    row
                })
                .collect();
            let mut view = TableView::new(headers(), tagged, 5);
            view.sort_by(column, ascending);

            let sorted = owned(view.filtered_rows());
            for pair in sorted.windows(2) {
                if pair[0][column] == pair[1][column] {
                    prop_assert!(pair[0][2] < pair[1][2], "equal keys reordered: {:?}", pair);
                }
            }
        }

        #[test]
        fn pages_stay_in_bounds(rows in rows(), page_size in 1usize..8, moves in prop::collection::vec(0u8..4, 0..30)) {
            let total = rows.len();
            let mut view = TableView::new(headers(), rows, page_size);
            for step in moves {
                match step {
                    0 => { view.next_page(); }
                    1 => { view.prev_page(); }
                    2 => view.select_next(),
                    _ => view.select_prev(),
                }
                let page_rows = view.current_page_rows();
                prop_assert!(view.page() < view.page_count());
                prop_assert!(view.page_offset() + page_rows.len() <= total);
                prop_assert!(page_rows.len() <= page_size);
                if let Some(selected) = view.selected() {
                    prop_assert!(selected < total);
                }
            }
            if total == 0 {
                prop_assert_eq!(view.page_count(), 1);
                prop_assert!(view.current_page_rows().is_empty());
            }
        }

        #[test]
        fn toggling_columns_twice_restores_mask(rows in rows()) {
            let mut view = TableView::new(headers(), rows, 5);
            let before = view.visibility().to_vec();
            view.toggle_columns();
            view.toggle_columns();
            prop_assert_eq!(before, view.visibility().to_vec());
        }
    }
}
