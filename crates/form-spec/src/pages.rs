use crate::spec::component::Component;

/// A contiguous run of components between page breaks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub components: Vec<Component>,
}

impl Page {
    pub fn component_ids(&self) -> Vec<&str> {
        self.components
            .iter()
            .map(|component| component.id.as_str())
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.iter().any(|component| component.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Splits components into pages at `page-break` markers.
///
/// Components are ordered by `order_index` first. Breaks are dropped and
/// never produce empty pages, whether leading, trailing or consecutive.
/// The result always holds at least one page; a form without any
/// non-break component yields a single empty page.
pub fn segment(components: &[Component]) -> Vec<Page> {
    let mut sorted = components.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|component| component.order_index);

    let mut pages = Vec::new();
    let mut current = Page::default();
    for component in sorted {
        if component.kind.is_page_break() {
            if !current.is_empty() {
                pages.push(std::mem::take(&mut current));
            }
        } else {
            current.components.push(component.clone());
        }
    }
    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    tracing::trace!(pages = pages.len(), "segmented components");
    pages
}
