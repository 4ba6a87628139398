//! An invoice composed with the fluent builders: header with logo and
//! title, sender/recipient blocks, an item table, totals, notes and payment
//! methods. Checks the page-level geometry a renderer would rely on.

use folio::layout::{Document, DrawCommand, LayoutElement};
use folio::model::*;
use folio::style::*;

const BLUE_MEDIUM: &str = "#2196F3";
const GREY_MEDIUM: &str = "#9E9E9E";
const GREY_LIGHTEN1: &str = "#BDBDBD";
const GREY_LIGHTEN2: &str = "#E0E0E0";
const GREY_LIGHTEN3: &str = "#EEEEEE";
const GREY_LIGHTEN4: &str = "#F5F5F5";

struct Item {
    sku: &'static str,
    name: &'static str,
    quantity: u32,
    unit_cents: u64,
}

const ITEMS: [Item; 5] = [
    Item { sku: "PROD-001", name: "Premium Laptop", quantity: 1, unit_cents: 129_999 },
    Item { sku: "PROD-002", name: "Wireless Mouse", quantity: 2, unit_cents: 2_999 },
    Item { sku: "PROD-003", name: "External SSD 1TB", quantity: 1, unit_cents: 15_999 },
    Item { sku: "SERV-001", name: "Extended Warranty", quantity: 1, unit_cents: 19_999 },
    Item { sku: "SERV-002", name: "Technical Support (Monthly)", quantity: 12, unit_cents: 1_999 },
];

fn money(cents: u64) -> String {
    let dollars = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}.{:02}", grouped, cents % 100)
}

fn labelled(label: &str, value: &str) -> Node {
    Node::spans(vec![
        TextSpan::styled(label, TextStyle::new().semi_bold()),
        TextSpan::new(value),
    ])
}

fn header() -> Node {
    let logo = Node::container(
        Node::text("COMPANY LOGO")
            .font_size(20.0)
            .color(Color::WHITE)
            .id("logo-text"),
    )
    .height(50.0)
    .background(Color::hex(GREY_MEDIUM))
    .align_center()
    .align_middle()
    .id("logo");

    let brand = Column::new()
        .item(logo)
        .item(Node::text("Your Trusted Business Partner").font_size(12.0).italic())
        .into_node();

    let title = Column::new()
        .item(
            Node::text("INVOICE")
                .font_size(24.0)
                .bold()
                .color(Color::hex(BLUE_MEDIUM))
                .align_right()
                .id("title"),
        )
        .item(labelled("Date: ", "May 12, 2025").align_right())
        .item(labelled("Invoice #: ", "INV-2025-0042").align_right())
        .into_node();

    Row::new().relative(1.0, brand).relative(1.0, title).into_node()
}

fn party(title: &str, lines: [&str; 3], extra: Node, last: Node) -> Node {
    Column::new()
        .item(
            Node::text(title)
                .color(Color::WHITE)
                .bold()
                .background(Color::hex(BLUE_MEDIUM))
                .padding(5.0),
        )
        .item(Node::text(lines[0]).bold().padding_left(5.0).padding_top(5.0))
        .item(Node::text(lines[1]).padding_left(5.0))
        .item(Node::text(lines[2]).padding_left(5.0))
        .item(extra.padding_left(5.0))
        .item(last.padding_left(5.0))
        .into_node()
}

fn cell(text: &str, background: &str) -> Node {
    Node::text(text)
        .border(0.5)
        .border_color(Color::hex(GREY_LIGHTEN1))
        .background(Color::hex(background))
        .padding(5.0)
}

fn items_table() -> Node {
    let mut table = Table::builder()
        .relative_column(1.0)
        .relative_column(3.0)
        .relative_column(1.0)
        .relative_column(1.0)
        .relative_column(1.0)
        .header(vec![
            cell("SKU", GREY_LIGHTEN2).bold(),
            cell("Item", GREY_LIGHTEN2).bold(),
            cell("Quantity", GREY_LIGHTEN2).bold().align_right(),
            cell("Unit Price", GREY_LIGHTEN2).bold().align_right(),
            cell("Amount", GREY_LIGHTEN2).bold().align_right(),
        ]);
    for (i, item) in ITEMS.iter().enumerate() {
        let bg = if i % 2 == 0 { "#FFFFFF" } else { GREY_LIGHTEN4 };
        table = table
            .cell(cell(item.sku, bg))
            .cell(cell(item.name, bg))
            .cell(cell(&item.quantity.to_string(), bg).align_right())
            .cell(cell(&money(item.unit_cents), bg).align_right())
            .cell(cell(&money(item.unit_cents * item.quantity as u64), bg).align_right());
    }
    table.build().unwrap().id("items")
}

fn totals() -> Node {
    let line = |label: Node, value: Node| {
        Row::new()
            .relative(1.0, label)
            .relative(1.0, value.align_right())
            .into_node()
    };
    let summary = Column::new()
        .item(line(Node::text("Subtotal:").semi_bold(), Node::text("$1,779.83")))
        .item(line(Node::text("Tax (9%):").semi_bold(), Node::text("$160.18")))
        .item(line(
            Node::text("Total:").font_size(12.0).bold(),
            Node::text("$1,940.01").font_size(12.0).bold().id("grand-total"),
        ))
        .into_node()
        .border(1.0)
        .border_color(Color::hex(GREY_MEDIUM))
        .padding(5.0)
        .id("totals");

    Row::new()
        .relative(3.0, Node::empty())
        .relative(2.0, summary)
        .into_node()
}

fn notes() -> Node {
    Table::builder()
        .relative_column(1.0)
        .header(vec![Node::text("Notes")
            .bold()
            .background(Color::hex(GREY_LIGHTEN2))
            .padding(5.0)])
        .cell(
            Node::text(
                "Payment is due within 30 days. Late payments are subject to a 1.5% monthly fee.",
            )
            .border(1.0)
            .border_color(Color::hex(GREY_LIGHTEN2))
            .padding(10.0),
        )
        .build()
        .unwrap()
        .id("notes")
}

fn payment_method(id: &str, title: &str, lines: [&str; 2]) -> Node {
    Column::new()
        .item(Node::text(title).bold())
        .item(Node::text(lines[0]))
        .item(Node::text(lines[1]))
        .into_node()
        .border(1.0)
        .border_color(Color::hex(GREY_MEDIUM))
        .background(Color::WHITE)
        .padding(5.0)
        .id(id)
}

fn payment() -> Node {
    let methods = Row::new()
        .spacing(10.0)
        .relative(
            1.0,
            payment_method("bank", "Bank Transfer", ["Account: 123456789", "Routing: 987654321"]),
        )
        .relative(
            1.0,
            payment_method(
                "card",
                "Credit Card",
                ["Visa, MasterCard, Amex", "Online payment: acmecorp.com/pay"],
            ),
        )
        .relative(
            1.0,
            payment_method("paypal", "PayPal", ["payments@acmecorp.com", "Include invoice # in notes"]),
        )
        .into_node()
        .padding_top(5.0);

    Column::new()
        .item(Node::text("Payment Methods").bold())
        .item(methods)
        .into_node()
        .background(Color::hex(GREY_LIGHTEN3))
        .padding(10.0)
}

fn invoice() -> Template {
    let parties = Row::new()
        .relative(
            1.0,
            party(
                "FROM",
                ["Acme Corporation", "123 Business Road", "Business City, BC 12345"],
                labelled("Email: ", "invoices@acmecorp.com"),
                labelled("Phone: ", "(555) 123-4567"),
            ),
        )
        .relative(
            1.0,
            party(
                "TO",
                ["John Smith", "456 Customer Street", "Customer City, CC 67890"],
                labelled("Email: ", "john.smith@example.com"),
                labelled("Customer since: ", "May 12, 2022"),
            ),
        )
        .into_node();

    let body = Column::new()
        .item(parties)
        .item(Node::container(items_table()).padding_top(20.0))
        .item(Node::container(totals()).padding_top(10.0))
        .item(Node::container(notes()).padding_top(20.0))
        .item(Node::container(payment()).padding_top(20.0))
        .into_node()
        .padding_vertical(20.0);

    Template::new(body)
        .page(
            PageSettings::default()
                .size(PageSize::A4)
                .margin(20.0)
                .background(Color::WHITE)
                .default_text(TextStyle::new().size(10.0)),
        )
        .header(header())
}

fn layout_invoice() -> Document {
    folio::layout(&invoice()).unwrap()
}

fn find<'a>(doc: &'a Document, id: &str) -> &'a LayoutElement {
    doc.pages[0]
        .find(id)
        .unwrap_or_else(|| panic!("no element with id {}", id))
}

#[test]
fn test_invoice_fits_one_page() {
    let doc = layout_invoice();
    assert_eq!(doc.page_count(), 1);
    assert!(doc.pages[0].warnings.is_empty());
    assert_eq!(doc.pages[0].elements[0].node_type, "PageBackground");
}

#[test]
fn test_invoice_contains_every_section() {
    let doc = layout_invoice();
    let lines = doc.pages[0].text_lines();
    for expected in [
        "COMPANY LOGO",
        "INVOICE",
        "Invoice #: INV-2025-0042",
        "FROM",
        "Customer since: May 12, 2022",
        "Technical Support (Monthly)",
        "$1,299.99",
        "$239.88",
        "$1,940.01",
        "Notes",
        "Payment Methods",
        "Include invoice # in notes",
    ] {
        assert!(
            lines.iter().any(|l| l == expected),
            "missing line {:?} in {:?}",
            expected,
            lines
        );
    }
}

#[test]
fn test_title_is_right_aligned_to_content_edge() {
    let doc = layout_invoice();
    let title = find(&doc, "title");
    let right_edge = 595.28 - 20.0;
    match &title.draw {
        DrawCommand::Text { lines } => {
            let line = &lines[0];
            assert!((line.x + line.width - right_edge).abs() < 1e-6);
            assert_eq!(line.runs[0].font_weight, 700);
            assert_eq!(line.runs[0].font_size, 24.0);
        }
        other => panic!("expected text, got {:?}", other),
    }
}

#[test]
fn test_logo_text_is_centered_in_its_box() {
    let doc = layout_invoice();
    let logo = find(&doc, "logo");
    let text = find(&doc, "logo-text");
    assert_eq!(logo.height, 50.0);
    // 20pt text at 1.2 line height is 24pt tall
    assert!((text.y - (logo.y + 13.0)).abs() < 1e-6);
    let left_gap = text.x - logo.x;
    let right_gap = logo.x + logo.width - (text.x + text.width);
    assert!((left_gap - right_gap).abs() < 1e-6);
}

#[test]
fn test_item_table_has_header_and_all_rows() {
    let doc = layout_invoice();
    let table = find(&doc, "items");
    assert_eq!(table.children.len(), 6);
    assert_eq!(table.children[0].node_type, "TableHeader");
    let skus: Vec<String> = table.children[1..]
        .iter()
        .map(|row| row.children[0].text_lines()[0].clone())
        .collect();
    assert_eq!(
        skus,
        vec!["PROD-001", "PROD-002", "PROD-003", "SERV-001", "SERV-002"]
    );
    // Cells in a row share its height
    for row in &table.children {
        for cell in &row.children {
            assert_eq!(cell.height, row.height);
        }
    }
}

#[test]
fn test_totals_take_two_fifths_on_the_right() {
    let doc = layout_invoice();
    let totals = find(&doc, "totals");
    let content_width = 595.28 - 40.0;
    assert!((totals.width - content_width * 2.0 / 5.0).abs() < 1e-6);
    assert!((totals.x + totals.width - (20.0 + content_width)).abs() < 1e-6);
}

#[test]
fn test_payment_methods_share_height_and_spacing() {
    let doc = layout_invoice();
    let bank = find(&doc, "bank");
    let card = find(&doc, "card");
    let paypal = find(&doc, "paypal");
    assert_eq!(bank.height, card.height);
    assert_eq!(card.height, paypal.height);
    assert!((card.x - (bank.x + bank.width) - 10.0).abs() < 1e-6);
    assert!((paypal.x - (card.x + card.width) - 10.0).abs() < 1e-6);
}

#[test]
fn test_sections_stack_in_order() {
    let doc = layout_invoice();
    let items = find(&doc, "items");
    let totals = find(&doc, "totals");
    let notes = find(&doc, "notes");
    let bank = find(&doc, "bank");
    assert!(items.bottom() <= totals.y);
    assert!(totals.bottom() <= notes.y);
    assert!(notes.bottom() <= bank.y);
    assert!(bank.bottom() <= 841.89 - 20.0);
}
