use form_spec::spec::component::TextConfig;
use form_spec::{Component, ComponentKind, Page, segment};

fn field(id: &str, order: i64) -> Component {
    Component::new(id, ComponentKind::Text(TextConfig::default()), order)
}

fn page_break(id: &str, order: i64) -> Component {
    Component::new(id, ComponentKind::PageBreak, order)
}

fn ids(pages: &[Page]) -> Vec<Vec<&str>> {
    pages.iter().map(Page::component_ids).collect()
}

#[test]
fn breaks_split_pages() {
    let components = vec![
        field("A", 0),
        page_break("pb1", 1),
        field("B", 2),
        page_break("pb2", 3),
        field("C", 4),
    ];
    let pages = segment(&components);
    assert_eq!(ids(&pages), vec![vec!["A"], vec!["B"], vec!["C"]]);
}

#[test]
fn leading_break_is_suppressed() {
    let pages = segment(&[page_break("pb", 0), field("A", 1)]);
    assert_eq!(ids(&pages), vec![vec!["A"]]);
}

#[test]
fn consecutive_breaks_do_not_emit_empty_pages() {
    let pages = segment(&[
        field("A", 0),
        page_break("pb1", 1),
        page_break("pb2", 2),
        field("B", 3),
    ]);
    assert_eq!(ids(&pages), vec![vec!["A"], vec!["B"]]);
}

#[test]
fn form_without_breaks_is_one_page() {
    let pages = segment(&[field("A", 0), field("B", 1), field("C", 2)]);
    assert_eq!(ids(&pages), vec![vec!["A", "B", "C"]]);
}

#[test]
fn section_headers_stay_on_their_page() {
    let header = Component::new("intro", ComponentKind::SectionHeader(Default::default()), 0);
    let pages = segment(&[header, field("A", 1), page_break("pb", 2), field("B", 3)]);
    assert_eq!(ids(&pages), vec![vec!["intro", "A"], vec!["B"]]);
}

#[test]
fn segmenting_flattened_pages_reproduces_boundaries() {
    let components = vec![
        page_break("pb0", 0),
        field("A", 1),
        field("B", 2),
        page_break("pb1", 3),
        page_break("pb2", 4),
        field("C", 5),
        page_break("pb3", 6),
    ];
    let pages = segment(&components);

    // Flatten while re-inserting a break between consecutive pages.
    let mut flattened = Vec::new();
    let mut order = 0;
    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            flattened.push(page_break(&format!("break-{index}"), order));
            order += 1;
        }
        for component in &page.components {
            let mut component = component.clone();
            component.order_index = order;
            order += 1;
            flattened.push(component);
        }
    }

    assert_eq!(ids(&segment(&flattened)), ids(&pages));
}
