//! Static HTML for the credential link flow. The form posts to
//! `/link/submit` with a small inline script and shows the JSON reply.

const STYLE: &str = r#"
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
         background: #f5f5f5; color: #333; display: flex; justify-content: center;
         align-items: center; min-height: 100vh; padding: 16px; }
  .card { background: #fff; border-radius: 12px; box-shadow: 0 2px 12px rgba(0,0,0,.1);
          max-width: 440px; width: 100%; padding: 32px; }
  h1 { font-size: 1.4rem; margin-bottom: 8px; }
  p { color: #666; font-size: .9rem; line-height: 1.5; margin-bottom: 16px; }
  label { font-weight: 600; font-size: .9rem; display: block; margin-bottom: 6px; }
  input[type=text] { width: 100%; padding: 10px 12px; border: 1px solid #ccc;
                     border-radius: 8px; font-size: 1rem; margin-bottom: 16px; }
  button { width: 100%; padding: 12px; background: #4a90d9; color: #fff; border: none;
           border-radius: 8px; font-size: 1rem; font-weight: 600; cursor: pointer; }
  button:disabled { background: #aaa; cursor: not-allowed; }
  .msg { margin-top: 12px; padding: 10px; border-radius: 8px; font-size: .9rem; display: none; }
  .msg.ok { display: block; background: #e6f4ea; color: #1e7e34; }
  .msg.err { display: block; background: #fdecea; color: #c62828; }
"#;

const SCRIPT: &str = r#"
async function submitLink(e) {
  e.preventDefault();
  const btn = document.getElementById('btn');
  const msg = document.getElementById('msg');
  btn.disabled = true;
  btn.textContent = 'Verifying...';
  msg.className = 'msg';
  try {
    const body = new URLSearchParams(new FormData(document.getElementById('f')));
    const res = await fetch('/link/submit', { method: 'POST', body });
    const data = await res.json();
    msg.className = data.ok ? 'msg ok' : 'msg err';
    msg.textContent = data.message;
    btn.textContent = data.ok ? 'Linked!' : 'Link Account';
    btn.disabled = data.ok;
  } catch {
    msg.className = 'msg err';
    msg.textContent = 'Network error. Please try again.';
    btn.disabled = false;
    btn.textContent = 'Link Account';
  }
  return false;
}
"#;

fn page(title: &str, body: &str, script: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <div class=\"card\">\n{body}\n</div>\n{script}</body>\n</html>\n"
    )
}

pub fn link_form(link_token: &str) -> String {
    let body = format!(
        r#"<h1>Link Your Canvas Account</h1>
<p>Paste your Canvas API token below. It is sent straight to the bot server over HTTPS and never through chat.</p>
<form id="f" onsubmit="return submitLink(event)">
  <input type="hidden" name="link_token" value="{}">
  <label for="access_token">Canvas API Token</label>
  <input type="text" id="access_token" name="access_token" autocomplete="off" placeholder="Paste your token here" required>
  <button type="submit" id="btn">Link Account</button>
</form>
<div id="msg" class="msg"></div>
<p>Your token is encrypted at rest and only used to read your Canvas data. Run /unlink in the bot to remove it.</p>"#,
        escape_html(link_token)
    );
    page(
        "Link Canvas Account",
        &body,
        &format!("<script>{SCRIPT}</script>\n"),
    )
}

pub fn expired() -> String {
    page(
        "Link Expired",
        "<h1>Link Expired</h1>\n<p>This link has expired or has already been used. \
         Run <strong>/setup</strong> in the bot to get a new link.</p>",
        "",
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}
