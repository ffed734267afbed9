//! Server-side HTML for the search page: chrome, status messages, card grid.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use storefront_core::search::PageState;
use storefront_core::types::{ViewItem, MSG_LOADING, MSG_NO_PRODUCTS};

const STYLE: &str = "\
body{margin:0;font-family:system-ui,sans-serif;color:#111}\
.page{min-height:100vh;display:flex;flex-direction:column}\
.navbar,.footer{padding:1rem 2rem;background:#f5f5f5}\
.navbar{display:flex;gap:1.5rem;align-items:center}\
.navbar .brand{font-weight:700;text-decoration:none;color:inherit}\
.content{flex-grow:1;width:100%;max-width:1280px;margin:0 auto;padding:2rem 1rem;box-sizing:border-box}\
.status{text-align:center;color:#6b7280;font-size:1.25rem}\
.grid{display:grid;gap:1.5rem;grid-template-columns:repeat(1,minmax(0,1fr))}\
@media(min-width:640px){.grid{grid-template-columns:repeat(2,minmax(0,1fr))}}\
@media(min-width:768px){.grid{grid-template-columns:repeat(3,minmax(0,1fr))}}\
@media(min-width:1024px){.grid{grid-template-columns:repeat(4,minmax(0,1fr))}}\
.card{display:block;text-decoration:none;color:inherit}\
.card img{width:100%;aspect-ratio:1;object-fit:cover;background:#eee}\
.card .price{color:#374151}";

/// Bytes escaped when an id becomes one path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

fn navbar(query: &str) -> String {
    format!(
        "<header class=\"navbar\"><a class=\"brand\" href=\"/\">Storefront</a>\
         <form action=\"/search\" method=\"get\" role=\"search\">\
         <input type=\"search\" name=\"q\" placeholder=\"Search products\" value=\"{}\">\
         </form></header>",
        escape_html(query)
    )
}

fn footer() -> &'static str {
    "<footer class=\"footer\"><p>&copy; Storefront</p></footer>"
}

/// Detail link for a product id.
pub fn product_href(id: &str) -> String {
    format!("/product/{}", utf8_percent_encode(id, PATH_SEGMENT))
}

/// One product card.
pub fn render_card(item: &ViewItem) -> String {
    format!(
        "<a class=\"card\" href=\"{href}\" data-id=\"{id}\">\
         <img src=\"{src}\" alt=\"{title}\" loading=\"lazy\">\
         <h3>{title}</h3><p class=\"price\">{price}</p></a>",
        href = escape_html(&product_href(&item.id)),
        id = escape_html(&item.id),
        src = escape_html(&item.image_url),
        title = escape_html(&item.title),
        price = escape_html(&item.display_price()),
    )
}

/// The part of the page that changes with state.
pub fn render_body(state: &PageState) -> String {
    match state {
        PageState::Loading => format!("<div class=\"status\">{MSG_LOADING}</div>"),
        PageState::Error(message) => format!("<div class=\"status\">{}</div>", escape_html(message)),
        PageState::Ready(items) if items.is_empty() => {
            format!("<div class=\"status\">{MSG_NO_PRODUCTS}</div>")
        }
        PageState::Ready(items) => {
            let mut grid = String::from("<div class=\"grid\">");
            for item in items {
                grid.push_str(&render_card(item));
            }
            grid.push_str("</div>");
            grid
        }
    }
}

/// Full HTML document: navbar, state body, footer.
pub fn render_page(state: &PageState, query: &str) -> String {
    let title = if query.is_empty() {
        "Search".to_string()
    } else {
        format!("Search: {}", escape_html(query))
    };
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title}</title><style>{STYLE}</style></head>\
         <body><div class=\"page\">{nav}<main class=\"content\">{body}</main>{footer}</div></body></html>",
        nav = navbar(query),
        body = render_body(state),
        footer = footer(),
    )
}
