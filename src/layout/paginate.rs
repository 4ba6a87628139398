//! # Pagination
//!
//! Splits the body into pages.
//!
//! The content tree is first flattened into a stream of [`Unit`]s. Columns
//! and undecorated containers dissolve into their children, with their
//! padding and margins turned into spacing. Tables dissolve into rows so
//! they can break between any two rows. Everything else is an atomic block
//! that lands on one page whole.
//!
//! Units are then fed through a small state machine
//! ([`PaginationState`]): a unit that fits is placed; one that doesn't
//! closes the page and is retried on a fresh one; one that doesn't fit
//! even on an empty page is placed anyway and flagged as overflow. Every
//! step either consumes a unit or closes a page that has content, so the
//! loop always terminates.

use super::boxes::{align_offset, border_box_width, decoration, resolve_content_area};
use super::flow::FlowLayout;
use super::measure::Measurer;
use super::page_break::{decide, BreakDecision, PaginationState, FIT_EPSILON};
use super::{DrawCommand, LayoutElement, LayoutWarning, Page};
use crate::error::{FolioError, Result};
use crate::model::{Node, NodeKind, PageSettings, Table, Template};
use crate::style::{BoxStyle, Color, EdgeValues, ResolvedTextStyle};

/// One step of body content.
enum Unit<'a> {
    /// Placed whole. `style` is the inherited text style.
    Block {
        node: &'a Node,
        x: f64,
        width: f64,
        style: ResolvedTextStyle,
    },
    /// Vertical gap.
    Spacing { height: f64, gap: Gap },
    /// One data row of the table in `frames[frame]`.
    TableRow { frame: usize, row: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gap {
    /// Column spacing. Dropped at the top of a page.
    Between,
    /// Top margin and padding. Moves to the next page with the content
    /// that follows it.
    Leading,
    /// Bottom padding and margin. May end a page.
    Trailing,
}

/// Geometry of a table that pagination splits by rows.
struct TableFrame<'a> {
    node: &'a Node,
    table: &'a Table,
    /// Border box.
    x: f64,
    width: f64,
    content_x: f64,
    inset_top: f64,
    inset_bottom: f64,
    columns: Vec<f64>,
    style: ResolvedTextStyle,
    header_height: f64,
    row_heights: Vec<f64>,
}

/// The part of a table on the page being filled.
struct Fragment {
    frame: usize,
    /// Body-relative y of the fragment's border box.
    top: f64,
    rows: Vec<LayoutElement>,
}

/// Tracks where we are on the page being filled.
struct PageCursor {
    number: usize,
    /// Body height used so far.
    y: f64,
    /// Leading gaps taken since the last placed content.
    lead: f64,
    has_content: bool,
    elements: Vec<LayoutElement>,
    warnings: Vec<LayoutWarning>,
    fragment: Option<Fragment>,
}

impl PageCursor {
    fn new(number: usize) -> Self {
        Self {
            number,
            y: 0.0,
            lead: 0.0,
            has_content: false,
            elements: Vec::new(),
            warnings: Vec::new(),
            fragment: None,
        }
    }
}

pub(super) struct Paginator<'a> {
    settings: &'a PageSettings,
    measurer: &'a Measurer<'a>,
    flow: FlowLayout<'a, 'a>,
    base: ResolvedTextStyle,
    page_width: f64,
    page_height: f64,
    content_x: f64,
    content_width: f64,
    body_top: f64,
    budget: f64,
    header: Option<LayoutElement>,
    footer: Option<LayoutElement>,
}

impl<'a> Paginator<'a> {
    /// Lay out the page furniture and work out the body budget.
    pub(super) fn new(template: &'a Template, measurer: &'a Measurer<'a>) -> Result<Self> {
        let settings = &template.page;
        let flow = FlowLayout::new(measurer);
        let base = settings.resolved_text();
        let (page_width, page_height) = settings.size.dimensions();
        let (content_width, content_height) = settings.content_size();
        let content_x = settings.margin.left;
        let content_y = settings.margin.top;

        let header_height = template
            .header
            .as_ref()
            .map_or(0.0, |h| measurer.measure(h, content_width, &base));
        let footer_height = template
            .footer
            .as_ref()
            .map_or(0.0, |f| measurer.measure(f, content_width, &base));

        let budget = content_height - header_height - footer_height;
        if budget <= FIT_EPSILON {
            return Err(FolioError::Config(format!(
                "header ({:.1}pt) and footer ({:.1}pt) leave no room in a {:.1}pt content area",
                header_height, footer_height, content_height
            )));
        }

        let header = template
            .header
            .as_ref()
            .map(|h| flow.place(h, content_x, content_y, content_width, &base));
        let footer = template.footer.as_ref().map(|f| {
            let y = content_y + content_height - footer_height;
            flow.place(f, content_x, y, content_width, &base)
        });

        Ok(Self {
            settings,
            measurer,
            flow,
            base,
            page_width,
            page_height,
            content_x,
            content_width,
            body_top: content_y + header_height,
            budget,
            header,
            footer,
        })
    }

    pub(super) fn run(self, content: &'a Node) -> Vec<Page> {
        let mut units = Vec::new();
        let mut frames = Vec::new();
        self.flatten(
            content,
            self.content_x,
            self.content_width,
            &self.base,
            &mut units,
            &mut frames,
        );
        log::debug!(
            "flattened body into {} units ({} table(s)), {:.1}pt per page",
            units.len(),
            frames.len(),
            self.budget
        );

        let mut pages = Vec::new();
        let mut cursor = PageCursor::new(1);
        let mut state = PaginationState::AccumulatingPage;
        let mut next = 0;

        loop {
            state = match state {
                PaginationState::AccumulatingPage => match units.get(next) {
                    None => PaginationState::Done,
                    Some(unit) => {
                        let (consumed, next_state) = self.step(unit, &mut cursor, &frames);
                        if consumed {
                            next += 1;
                        }
                        next_state
                    }
                },
                PaginationState::PageFull => {
                    let number = cursor.number;
                    let lead = cursor.lead;
                    pages.push(self.finish_page(cursor, &frames));
                    // Insets opened for content that did not fit travel with it
                    cursor = PageCursor::new(number + 1);
                    cursor.y = lead;
                    cursor.lead = lead;
                    PaginationState::AccumulatingPage
                }
                PaginationState::Done => {
                    if cursor.has_content {
                        pages.push(self.finish_page(cursor, &frames));
                    }
                    break;
                }
            };
        }

        pages
    }

    // ── Flattening ──────────────────────────────────────────────

    fn flatten(
        &self,
        node: &'a Node,
        x: f64,
        width: f64,
        inherited: &ResolvedTextStyle,
        units: &mut Vec<Unit<'a>>,
        frames: &mut Vec<TableFrame<'a>>,
    ) {
        let style = &node.style;
        match &node.kind {
            NodeKind::Column { items, spacing } if style.is_transparent() => {
                let ts = node.text_style.resolve(inherited);
                let (ix, iw) = inner_span(style, x, width);
                push_spacing(units, style.margin.top + style.padding.top, Gap::Leading);
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        push_spacing(units, *spacing, Gap::Between);
                    }
                    self.flatten(item, ix, iw, &ts, units, frames);
                }
                push_spacing(units, style.padding.bottom + style.margin.bottom, Gap::Trailing);
            }

            NodeKind::Container { child } if style.is_transparent() => {
                let ts = node.text_style.resolve(inherited);
                let (ix, iw) = inner_span(style, x, width);
                push_spacing(units, style.margin.top + style.padding.top, Gap::Leading);
                if let Some(child) = child {
                    self.flatten(child, ix, iw, &ts, units, frames);
                }
                push_spacing(units, style.padding.bottom + style.margin.bottom, Gap::Trailing);
            }

            NodeKind::Table(table) if style.height.is_none() && !table.rows.is_empty() => {
                let ts = node.text_style.resolve(inherited);
                let available = width - style.margin.horizontal();
                let box_width = border_box_width(style, width);
                let bx = x + style.margin.left + align_offset(available, box_width, style.align);
                let area = resolve_content_area(box_width, &style.padding, &style.border);
                let columns = self.measurer.column_widths(table, area.width);
                let header_height = table
                    .header
                    .as_ref()
                    .map_or(0.0, |h| self.measurer.row_height(h, &columns, &ts));
                let row_heights = table
                    .rows
                    .iter()
                    .map(|r| self.measurer.row_height(r, &columns, &ts))
                    .collect();

                let frame = frames.len();
                frames.push(TableFrame {
                    node,
                    table,
                    x: bx,
                    width: box_width,
                    content_x: bx + area.left,
                    inset_top: area.top,
                    inset_bottom: style.padding.bottom + style.border.bottom,
                    columns,
                    style: ts,
                    header_height,
                    row_heights,
                });

                push_spacing(units, style.margin.top, Gap::Leading);
                units.extend((0..table.rows.len()).map(|row| Unit::TableRow { frame, row }));
                push_spacing(units, style.margin.bottom, Gap::Trailing);
            }

            _ => units.push(Unit::Block {
                node,
                x,
                width,
                style: inherited.clone(),
            }),
        }
    }

    // ── State machine ───────────────────────────────────────────

    /// Handle one unit. Returns whether it was consumed and the next state.
    fn step(
        &self,
        unit: &Unit<'a>,
        cursor: &mut PageCursor,
        frames: &[TableFrame<'a>],
    ) -> (bool, PaginationState) {
        let remaining = self.budget - cursor.y;

        match unit {
            Unit::Spacing { height, gap } => {
                if *gap == Gap::Between && !cursor.has_content {
                    return (true, PaginationState::AccumulatingPage);
                }
                let fits = *height <= remaining + FIT_EPSILON;
                match gap {
                    Gap::Leading if fits || !cursor.has_content => {
                        // A lead taller than an empty page is dropped
                        if fits {
                            cursor.y += height;
                            cursor.lead += height;
                        }
                        (true, PaginationState::AccumulatingPage)
                    }
                    Gap::Leading => {
                        cursor.lead += height;
                        (true, PaginationState::PageFull)
                    }
                    _ => {
                        cursor.lead = 0.0;
                        if fits {
                            cursor.y += height;
                            (true, PaginationState::AccumulatingPage)
                        } else if cursor.has_content {
                            // The gap ends the page; it is not carried over
                            (true, PaginationState::PageFull)
                        } else {
                            (true, PaginationState::AccumulatingPage)
                        }
                    }
                }
            }

            Unit::Block {
                node,
                x,
                width,
                style,
            } => {
                let required = self.measurer.measure(node, *width, style);
                match decide(remaining, required, cursor.has_content) {
                    BreakDecision::Place => {
                        self.place_block(cursor, node, *x, *width, style, required);
                        (true, PaginationState::AccumulatingPage)
                    }
                    BreakDecision::NextPage => {
                        log::debug!(
                            "page {}: {} ({:.1}pt) does not fit in {:.1}pt, breaking",
                            cursor.number,
                            node.label(),
                            required,
                            remaining
                        );
                        (false, PaginationState::PageFull)
                    }
                    BreakDecision::Overflow => {
                        self.record_overflow(cursor, node, required);
                        self.place_block(cursor, node, *x, *width, style, required);
                        (true, PaginationState::PageFull)
                    }
                }
            }

            Unit::TableRow { frame, row } => {
                let f = &frames[*frame];
                let open = cursor.fragment.as_ref().is_some_and(|fr| fr.frame == *frame);
                // A fresh fragment needs its top inset and the header, which
                // must share the page with at least this row
                let lead = if open { 0.0 } else { f.inset_top + f.header_height };
                let required = lead + f.row_heights[*row] + f.inset_bottom;

                match decide(remaining, required, cursor.has_content) {
                    BreakDecision::NextPage => {
                        log::debug!(
                            "page {}: row {} of {} does not fit, breaking",
                            cursor.number,
                            row,
                            f.node.label()
                        );
                        (false, PaginationState::PageFull)
                    }
                    decision => {
                        if decision == BreakDecision::Overflow {
                            self.record_overflow(cursor, f.node, required);
                        }
                        if !open {
                            self.open_fragment(cursor, *frame, f);
                        }
                        self.place_row(cursor, f, *row);
                        if *row + 1 == f.table.rows.len() {
                            self.close_fragment(cursor, frames);
                        }
                        if decision == BreakDecision::Overflow {
                            (true, PaginationState::PageFull)
                        } else {
                            (true, PaginationState::AccumulatingPage)
                        }
                    }
                }
            }
        }
    }

    fn place_block(
        &self,
        cursor: &mut PageCursor,
        node: &Node,
        x: f64,
        width: f64,
        style: &ResolvedTextStyle,
        height: f64,
    ) {
        log::trace!(
            "page {}: {} at y={:.1} ({:.1}pt)",
            cursor.number,
            node.label(),
            cursor.y,
            height
        );
        let element = self.flow.place(node, x, self.body_top + cursor.y, width, style);
        cursor.elements.push(element);
        cursor.y += height;
        cursor.lead = 0.0;
        cursor.has_content = true;
    }

    fn record_overflow(&self, cursor: &mut PageCursor, node: &Node, required: f64) {
        log::warn!(
            "page {}: {} needs {:.1}pt but a page body is {:.1}pt; placing it anyway",
            cursor.number,
            node.label(),
            required,
            self.budget
        );
        cursor.warnings.push(LayoutWarning::Overflow {
            id: node.label(),
            required,
            available: self.budget,
        });
    }

    // ── Table fragments ─────────────────────────────────────────

    fn open_fragment(&self, cursor: &mut PageCursor, frame: usize, f: &TableFrame<'a>) {
        let top = cursor.y;
        cursor.y += f.inset_top;
        let mut rows = Vec::new();
        if let Some(header) = &f.table.header {
            rows.push(self.flow.place_table_row(
                header,
                &f.columns,
                f.content_x,
                self.body_top + cursor.y,
                &f.style,
                "TableHeader",
            ));
            cursor.y += f.header_height;
        }
        cursor.fragment = Some(Fragment { frame, top, rows });
        cursor.lead = 0.0;
        cursor.has_content = true;
    }

    fn place_row(&self, cursor: &mut PageCursor, f: &TableFrame<'a>, row: usize) {
        let element = self.flow.place_table_row(
            &f.table.rows[row],
            &f.columns,
            f.content_x,
            self.body_top + cursor.y,
            &f.style,
            "TableRow",
        );
        cursor.y += f.row_heights[row];
        if let Some(fragment) = cursor.fragment.as_mut() {
            fragment.rows.push(element);
        }
    }

    /// Wrap the rows placed on this page in the table's own box.
    fn close_fragment(&self, cursor: &mut PageCursor, frames: &[TableFrame<'a>]) {
        let Some(fragment) = cursor.fragment.take() else {
            return;
        };
        let f = &frames[fragment.frame];
        cursor.y += f.inset_bottom;
        cursor.elements.push(LayoutElement {
            x: f.x,
            y: self.body_top + fragment.top,
            width: f.width,
            height: cursor.y - fragment.top,
            draw: decoration(&f.node.style),
            children: fragment.rows,
            node_type: "Table".to_string(),
            id: f.node.id.clone(),
        });
    }

    // ── Page assembly ───────────────────────────────────────────

    fn finish_page(&self, mut cursor: PageCursor, frames: &[TableFrame<'a>]) -> Page {
        self.close_fragment(&mut cursor, frames);
        log::debug!(
            "page {} finished: {} element(s), {:.1}pt of {:.1}pt used",
            cursor.number,
            cursor.elements.len(),
            cursor.y,
            self.budget
        );

        let mut elements = Vec::with_capacity(cursor.elements.len() + 3);
        if let Some(background) = self.settings.background {
            elements.push(self.background(background));
        }
        elements.extend(self.header.iter().cloned());
        elements.extend(cursor.elements);
        elements.extend(self.footer.iter().cloned());

        Page {
            number: cursor.number,
            width: self.page_width,
            height: self.page_height,
            elements,
            warnings: cursor.warnings,
        }
    }

    fn background(&self, color: Color) -> LayoutElement {
        LayoutElement {
            x: 0.0,
            y: 0.0,
            width: self.page_width,
            height: self.page_height,
            draw: DrawCommand::Rect {
                background: Some(color),
                border_width: EdgeValues::default(),
                border_color: color,
            },
            children: Vec::new(),
            node_type: "PageBackground".to_string(),
            id: None,
        }
    }
}

/// Horizontal span left for a transparent wrapper's children.
fn inner_span(style: &BoxStyle, x: f64, width: f64) -> (f64, f64) {
    (
        x + style.margin.left + style.padding.left,
        (width - style.margin.horizontal() - style.padding.horizontal()).max(0.0),
    )
}

fn push_spacing(units: &mut Vec<Unit<'_>>, height: f64, gap: Gap) {
    if height > 0.0 {
        units.push(Unit::Spacing { height, gap });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontContext;
    use crate::model::{Column, Edges, PageSize};

    fn template(content: Node, body: f64) -> Template {
        Template::new(content).page(
            PageSettings::default()
                .size(PageSize::Custom {
                    width: 300.0,
                    height: body,
                })
                .margin(0.0),
        )
    }

    fn paginate(template: &Template) -> Vec<Page> {
        let fc = FontContext::new();
        let m = Measurer::new(&fc);
        Paginator::new(template, &m).unwrap().run(&template.content)
    }

    fn block(h: f64) -> Node {
        Node::empty().height(h)
    }

    #[test]
    fn transparent_column_flattens() {
        let fc = FontContext::new();
        let m = Measurer::new(&fc);
        let t = template(
            Column::new()
                .spacing(4.0)
                .item(block(10.0))
                .item(Column::new().item(block(10.0)).item(block(10.0)).into_node())
                .into_node(),
            100.0,
        );
        let p = Paginator::new(&t, &m).unwrap();
        let mut units = Vec::new();
        let mut frames = Vec::new();
        p.flatten(&t.content, 0.0, 300.0, &p.base, &mut units, &mut frames);
        let blocks = units.iter().filter(|u| matches!(u, Unit::Block { .. })).count();
        assert_eq!(blocks, 3);
    }

    #[test]
    fn spacing_collapses_at_page_top() {
        let t = template(
            Column::new()
                .spacing(10.0)
                .item(block(50.0))
                .item(block(50.0).id("second"))
                .into_node(),
            55.0,
        );
        let pages = paginate(&t);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].find("second").unwrap().y, 0.0);
    }

    #[test]
    fn padding_is_not_collapsed() {
        let t = template(
            Node::container(block(20.0).id("inner")).padding_top(7.0),
            100.0,
        );
        let pages = paginate(&t);
        assert_eq!(pages[0].find("inner").unwrap().y, 7.0);
    }

    #[test]
    fn top_padding_moves_with_its_content() {
        let t = template(
            Column::new()
                .item(block(90.0))
                .item(Node::container(block(50.0).id("inner")).padding_top(20.0))
                .into_node(),
            100.0,
        );
        let pages = paginate(&t);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].find("inner").unwrap().y, 20.0);
    }

    #[test]
    fn fitting_top_padding_follows_content_that_breaks() {
        let t = template(
            Column::new()
                .item(block(70.0))
                .item(Node::container(block(50.0).id("inner")).padding_top(20.0))
                .into_node(),
            100.0,
        );
        let pages = paginate(&t);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].find("inner").unwrap().y, 20.0);
    }

    #[test]
    fn bottom_padding_may_end_a_page() {
        let t = template(
            Column::new()
                .item(Node::container(block(90.0)).padding_bottom(20.0))
                .item(block(10.0).id("next"))
                .into_node(),
            100.0,
        );
        let pages = paginate(&t);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].find("next").unwrap().y, 0.0);
    }

    #[test]
    fn decorated_column_is_atomic() {
        let t = template(
            Column::new()
                .item(block(40.0))
                .item(block(40.0))
                .into_node()
                .border(1.0)
                .id("boxed"),
            60.0,
        );
        let pages = paginate(&t);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].warnings.len(), 1);
    }

    #[test]
    fn zero_units_make_zero_pages() {
        assert!(paginate(&template(Column::new().into_node(), 100.0)).is_empty());
        assert!(paginate(&template(Node::empty(), 100.0)).is_empty());
    }

    #[test]
    fn table_margin_is_spacing() {
        let table = crate::model::Table::builder()
            .relative_column(1.0)
            .row(vec![block(10.0)])
            .build()
            .unwrap()
            .margin(Edges {
                top: 5.0,
                ..Edges::default()
            })
            .id("t");
        let pages = paginate(&template(table, 100.0));
        let t = pages[0].find("t").unwrap();
        assert_eq!(t.y, 5.0);
        assert_eq!(t.height, 10.0);
    }
}
