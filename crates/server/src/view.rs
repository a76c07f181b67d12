//! HTML rendering of the single inventory page.

use std::fmt::Write as _;

use shared::domain::{Product, ProductId};

use crate::controller::{PageView, RowView};

const STYLE: &str = "\
body{font-family:sans-serif;margin:0;padding:16px;height:100vh;box-sizing:border-box}\
form.page{display:flex;flex-direction:column;height:100%}\
div.add{display:flex;flex-direction:column;gap:8px;max-width:420px}\
ul.products{list-style:none;padding:0;margin:16px 0 0;overflow-y:auto;flex:1}\
ul.products li{display:flex;align-items:center;justify-content:space-between;gap:8px;padding:4px 0}\
ul.products .name{flex:1}\
button.danger{color:#c62828}\
.stock.out{color:#9e9e9e}";

/// Renders the whole page as a single form.
///
/// Every button submits the same form and names itself through `action`, so
/// each post also carries the add-form fields and any open rename draft.
pub fn render_page(title: &str, view: &PageView) -> String {
    let mut html = String::with_capacity(1024 + view.rows.len() * 512);
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <form class=\"page\" method=\"post\" action=\"/\" novalidate>\n",
        title = escape(title),
        style = STYLE,
    );

    let _ = write!(
        html,
        "<div class=\"add\">\n\
         <label>Product name <input type=\"text\" name=\"name\" value=\"{name}\"></label>\n\
         <label>Stock <input type=\"number\" name=\"quantity\" inputmode=\"numeric\" value=\"{quantity}\"></label>\n\
         <button type=\"submit\" name=\"action\" value=\"add\" aria-label=\"Add product\">&#x2795;</button>\n\
         </div>\n",
        name = escape(&view.add_form.name),
        quantity = escape(&view.add_form.quantity),
    );

    html.push_str("<ul class=\"products\">\n");
    for row in &view.rows {
        match row {
            RowView::Viewing(product) => render_viewing_row(&mut html, product),
            RowView::Editing { product_id, draft } => {
                render_editing_row(&mut html, *product_id, draft)
            }
        }
    }
    html.push_str("</ul>\n</form>\n</body>\n</html>\n");
    html
}

fn render_viewing_row(html: &mut String, product: &Product) {
    let _ = write!(
        html,
        "<li id=\"product-{id}\">\n<span class=\"name\">{name}</span>\n<span class=\"{class}\">stock: {quantity}</span>\n",
        id = product.id,
        name = escape(&product.name),
        class = if product.is_out_of_stock() { "stock out" } else { "stock" },
        quantity = product.quantity,
    );
    row_button(html, "decrement", product.id, "&#x2796;", "Decrease stock", false);
    row_button(html, "increment", product.id, "&#x2795;", "Increase stock", false);
    row_button(html, "delete", product.id, "&#x1F5D1;", "Delete product", true);
    row_button(html, "start_edit", product.id, "&#x270E;", "Rename product", false);
    html.push_str("</li>\n");
}

fn render_editing_row(html: &mut String, product_id: ProductId, draft: &str) {
    let _ = write!(
        html,
        "<li id=\"product-{product_id}\">\n\
         <input type=\"text\" name=\"draft\" class=\"name\" value=\"{draft}\" autofocus>\n\
         <button type=\"submit\" name=\"action\" value=\"save\" aria-label=\"Save name\">&#x1F4BE;</button>\n\
         <button type=\"submit\" name=\"action\" value=\"cancel\" class=\"danger\" aria-label=\"Cancel rename\">&#x2716;</button>\n\
         </li>\n",
        draft = escape(draft),
    );
}

fn row_button(
    html: &mut String,
    action: &str,
    id: ProductId,
    icon: &str,
    label: &str,
    danger: bool,
) {
    let class = if danger { " class=\"danger\"" } else { "" };
    let _ = writeln!(
        html,
        "<button type=\"submit\" name=\"action\" value=\"{action}:{id}\"{class} aria-label=\"{label}\">{icon}</button>",
    );
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
