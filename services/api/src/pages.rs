//! Server-rendered pages: the landing page, the two registration forms, the
//! booking-status page, and the admin panel shell. Rendering is split into
//! pure functions over already-fetched data so the HTML contracts are
//! testable without a running server.

use crate::infra::DeskService;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use stagepass::pricing::PriceBoard;
use stagepass::registration::{RegistrationKind, StatusView};

pub(crate) fn page_router(service: Arc<DeskService>) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/register/performer", get(performer_form_page))
        .route("/register/audience", get(audience_form_page))
        .route("/status", get(status_page))
        .route("/admin", get(admin_page))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusQuery {
    #[serde(rename = "orderId")]
    pub(crate) order_id: Option<String>,
}

pub(crate) async fn landing_page(State(service): State<Arc<DeskService>>) -> Html<String> {
    let board = service.prices().unwrap_or_else(|err| {
        error!(error = %err, "falling back to default prices on the landing page");
        PriceBoard::default()
    });
    Html(render_landing(board))
}

pub(crate) async fn performer_form_page() -> Html<String> {
    Html(render_registration_form(RegistrationKind::Performer))
}

pub(crate) async fn audience_form_page() -> Html<String> {
    Html(render_registration_form(RegistrationKind::Audience))
}

pub(crate) async fn status_page(
    State(service): State<Arc<DeskService>>,
    Query(query): Query<StatusQuery>,
) -> Html<String> {
    let Some(order_id) = query.order_id.filter(|id| !id.trim().is_empty()) else {
        return Html(render_status_lookup_form());
    };

    match service.lookup(order_id.trim()) {
        Ok(Some(view)) => Html(render_status_view(&view)),
        Ok(None) => Html(render_status_not_found(order_id.trim())),
        Err(err) => {
            error!(error = %err, %order_id, "status page lookup failed");
            Html(render_status_error())
        }
    }
}

pub(crate) async fn admin_page() -> Html<String> {
    Html(render_admin_shell())
}

// Minimal manual escaping; every interpolated user value goes through this.
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn page_shell(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | StagePass</title>\n</head>\n<body>\n\
         <header><a href=\"/\">StagePass Showcase Night</a></header>\n\
         <main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape_html(title),
        body = body,
    )
}

pub(crate) fn render_landing(board: PriceBoard) -> String {
    let body = format!(
        "<h1>Showcase Night</h1>\n\
         <p>Register to perform on stage or book an audience seat.</p>\n\
         <section>\n\
         <article>\n<h2>Performer</h2>\n<p class=\"price\">&#8377;{performer}</p>\n\
         <a href=\"/register/performer\">Register as performer</a>\n</article>\n\
         <article>\n<h2>Audience</h2>\n<p class=\"price\">&#8377;{audience}</p>\n\
         <a href=\"/register/audience\">Book audience seat</a>\n</article>\n\
         <article>\n<h2>Booking Status</h2>\n<p>Already registered?</p>\n\
         <a href=\"/status\">Check your booking status</a>\n</article>\n\
         </section>",
        performer = board.performer_price,
        audience = board.audience_price,
    );
    page_shell("Showcase Night", &body)
}

pub(crate) fn render_registration_form(kind: RegistrationKind) -> String {
    let (title, extra_field) = match kind {
        RegistrationKind::Performer => (
            "Performer Registration",
            "<label>Performance type\n<input name=\"performance_type\" required></label>\n",
        ),
        RegistrationKind::Audience => ("Audience Registration", ""),
    };
    let body = format!(
        "<h1>{title}</h1>\n\
         <form method=\"post\" action=\"/api/v1/registrations/{kind}\" enctype=\"multipart/form-data\" onsubmit=\"submitRegistration(event)\">\n\
         <label>Name\n<input name=\"name\" required></label>\n\
         <label>Email\n<input name=\"email\" type=\"email\" required></label>\n\
         <label>Mobile\n<input name=\"mobile\" required></label>\n\
         {extra_field}\
         <label>Profile photo\n<input name=\"profile_photo\" type=\"file\" accept=\"image/*\" required></label>\n\
         <label>Payment screenshot\n<input name=\"payment_screenshot\" type=\"file\" accept=\"image/*\" required></label>\n\
         <label>Payment transaction id\n<input name=\"transaction_id\" required></label>\n\
         <button type=\"submit\">Submit registration</button>\n\
         </form>\n\
         <section id=\"confirmation\" hidden>\n\
         <h2>Registration received</h2>\n\
         <p>Your order id is <strong id=\"order-id\"></strong></p>\n\
         <p class=\"notice\" id=\"notice\"></p>\n\
         <p><a href=\"/status\">Check your booking status</a></p>\n\
         </section>\n\
         {script}",
        title = title,
        kind = kind.label(),
        extra_field = extra_field,
        script = SUBMIT_SCRIPT,
    );
    page_shell(title, &body)
}

// Intercepts the form post so the order id and its one-time notice land on
// a rendered confirmation instead of a raw JSON page. The plain multipart
// post stays as the no-script fallback.
const SUBMIT_SCRIPT: &str = r#"<script>
async function submitRegistration(event) {
  event.preventDefault();
  const form = event.target;
  const response = await fetch(form.action, { method: 'POST', body: new FormData(form) });
  const payload = await response.json();
  if (!response.ok) {
    alert(payload.error || 'Registration failed, please try again');
    return;
  }
  document.getElementById('order-id').textContent = payload.order_id;
  document.getElementById('notice').textContent = payload.notice;
  form.hidden = true;
  document.getElementById('confirmation').hidden = false;
}
</script>"#;

pub(crate) fn render_status_lookup_form() -> String {
    let body = "<h1>Booking Status</h1>\n\
         <form method=\"get\" action=\"/status\">\n\
         <label>Order ID\n<input name=\"orderId\" placeholder=\"ORD...\" required></label>\n\
         <button type=\"submit\">Check status</button>\n\
         </form>";
    page_shell("Booking Status", body)
}

pub(crate) fn render_status_view(view: &StatusView) -> String {
    let mut body = format!(
        "<h1>Booking Status</h1>\n\
         <p>Order <strong>{order_id}</strong></p>\n\
         <p class=\"status status-{status}\">{status}</p>\n",
        order_id = escape_html(&view.order_id),
        status = escape_html(view.status),
    );

    // Personal details only exist on the view once the booking is approved.
    if let (Some(name), Some(email), Some(mobile)) = (&view.name, &view.email, &view.mobile) {
        body.push_str(&format!(
            "<dl>\n<dt>Name</dt><dd>{name}</dd>\n\
             <dt>Email</dt><dd>{email}</dd>\n\
             <dt>Mobile</dt><dd>{mobile}</dd>\n</dl>\n",
            name = escape_html(name),
            email = escape_html(email),
            mobile = escape_html(mobile),
        ));
    }
    if let Some(url) = &view.profile_photo_url {
        body.push_str(&format!(
            "<img src=\"{url}\" alt=\"Profile photo\">\n",
            url = escape_html(url),
        ));
    }

    body.push_str("<p><a href=\"/status\">Check another order</a></p>");
    page_shell("Booking Status", &body)
}

pub(crate) fn render_status_not_found(order_id: &str) -> String {
    let body = format!(
        "<h1>Booking Status</h1>\n\
         <p>No registration found with order id <strong>{order_id}</strong>.</p>\n\
         <p><a href=\"/status\">Try again</a></p>",
        order_id = escape_html(order_id),
    );
    page_shell("Booking Status", &body)
}

pub(crate) fn render_status_error() -> String {
    let body = "<h1>Booking Status</h1>\n\
         <p>There was an error checking your registration status. Please try again.</p>\n\
         <p><a href=\"/status\">Back</a></p>";
    page_shell("Booking Status", body)
}

// The admin panel is a static shell; every data interaction goes through the
// bearer-gated JSON endpoints so the page itself never holds credentials.
pub(crate) fn render_admin_shell() -> String {
    let body = r#"<h1>Admin Panel</h1>
<section id="login">
<form onsubmit="login(event)">
<label>Username <input id="username" required></label>
<label>Password <input id="password" type="password" required></label>
<button type="submit">Sign in</button>
</form>
</section>
<section id="panel" hidden>
<nav>
<button onclick="loadRoster('performer')">Performers</button>
<button onclick="loadRoster('audience')">Audience</button>
<button onclick="logout()">Sign out</button>
</nav>
<form onsubmit="savePrices(event)">
<label>Performer price <input id="performer_price" type="number" min="0"></label>
<label>Audience price <input id="audience_price" type="number" min="0"></label>
<button type="submit">Save prices</button>
</form>
<div id="roster"></div>
</section>
<script>
let token = null;

async function login(event) {
  event.preventDefault();
  const response = await fetch('/api/v1/admin/session', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({
      username: document.getElementById('username').value,
      password: document.getElementById('password').value,
    }),
  });
  if (!response.ok) { alert('Invalid credentials'); return; }
  token = (await response.json()).token;
  document.getElementById('login').hidden = true;
  document.getElementById('panel').hidden = false;
  await loadPrices();
  await loadRoster('performer');
}

async function logout() {
  await fetch('/api/v1/admin/session', {
    method: 'DELETE',
    headers: { 'Authorization': 'Bearer ' + token },
  });
  token = null;
  document.getElementById('panel').hidden = true;
  document.getElementById('login').hidden = false;
}

async function loadPrices() {
  const board = await (await fetch('/api/v1/prices')).json();
  document.getElementById('performer_price').value = board.performer_price;
  document.getElementById('audience_price').value = board.audience_price;
}

async function savePrices(event) {
  event.preventDefault();
  const response = await fetch('/api/v1/admin/prices', {
    method: 'PUT',
    headers: {
      'Content-Type': 'application/json',
      'Authorization': 'Bearer ' + token,
    },
    body: JSON.stringify({
      performer_price: Number(document.getElementById('performer_price').value),
      audience_price: Number(document.getElementById('audience_price').value),
    }),
  });
  alert(response.ok ? 'Prices updated' : 'Failed to update prices');
}

async function loadRoster(kind) {
  const response = await fetch('/api/v1/admin/roster/' + kind, {
    headers: { 'Authorization': 'Bearer ' + token },
  });
  if (!response.ok) { alert('Failed to load registrations'); return; }
  const records = await response.json();
  const roster = document.getElementById('roster');
  roster.textContent = '';
  for (const record of records) {
    const row = document.createElement('div');
    const label = document.createElement('span');
    label.textContent =
      record.order_id + ' | ' + record.applicant.name + ' | ' + record.status;
    row.appendChild(label);
    if (record.status === 'pending') {
      row.appendChild(decisionButton(record.id, 'approve', kind));
      row.appendChild(decisionButton(record.id, 'decline', kind));
    }
    roster.appendChild(row);
  }
}

function decisionButton(id, decision, kind) {
  const button = document.createElement('button');
  button.textContent = decision;
  button.onclick = async () => {
    const response = await fetch(
      '/api/v1/admin/registrations/' + id + '/' + decision,
      { method: 'POST', headers: { 'Authorization': 'Bearer ' + token } },
    );
    if (!response.ok) { alert('Decision failed'); }
    await loadRoster(kind);
  };
  return button;
}
</script>"#;
    page_shell("Admin Panel", body)
}
