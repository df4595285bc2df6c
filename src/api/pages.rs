//! Server-rendered HTML pages

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 2em auto; max-width: 960px; color: #222; }
h1 { font-size: 1.6em; }
form { margin: 1em 0; }
input[type=text] { width: 60%; padding: 0.4em; }
button { padding: 0.4em 1.2em; }
.stage { position: relative; display: inline-block; }
.stage img, .stage canvas { display: block; max-width: 100%; }
.stage canvas { position: absolute; left: 0; top: 0; cursor: crosshair; }
"#;

/// Escape text for use inside HTML content and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
{body}
</body>
</html>"#
    )
}

/// Landing page with the upload form
pub fn upload_page() -> String {
    layout(
        "Inpaint Studio",
        r#"<h1>Upload an image</h1>
<form method="post" action="/upload" enctype="multipart/form-data">
  <input type="file" name="image" accept=".png,.jpg,.jpeg" required>
  <button type="submit">Upload</button>
</form>"#,
    )
}

/// Mask editor for a stored upload
pub fn edit_page(image_filename: &str) -> String {
    let name = escape_html(image_filename);
    let body = format!(
        r#"<h1>Select the region to repaint</h1>
<p>Drag a rectangle over the area to change, then describe what should appear there.</p>
<div class="stage">
  <img id="source" src="/static/uploads/{name}" alt="{name}">
  <canvas id="overlay"></canvas>
</div>
<form id="promptForm" method="post" action="/process_image">
  <input type="hidden" name="image_filename" value="{name}">
  <input type="hidden" id="maskData" name="mask_data" value="">
  <input type="text" name="prompt" placeholder="Prompt" required>
  <button type="submit">Generate</button>
</form>
<script>{EDIT_SCRIPT}</script>"#
    );
    layout("Edit image", &body)
}

/// Page showing the generated output
pub fn result_page(output_filename: &str) -> String {
    let name = escape_html(output_filename);
    let body = format!(
        r#"<h1>Result</h1>
<img src="/static/outputs/{name}" alt="Generated image">
<p><a href="/static/outputs/{name}" download>Download</a> &middot; <a href="/">Edit another image</a></p>"#
    );
    layout("Result", &body)
}

// Rectangle coordinates are reported in the image's natural pixel space,
// independent of how the browser scaled it.
const EDIT_SCRIPT: &str = r#"
document.addEventListener('DOMContentLoaded', () => {
  const img = document.getElementById('source');
  const canvas = document.getElementById('overlay');
  const ctx = canvas.getContext('2d');
  const form = document.getElementById('promptForm');
  const maskData = document.getElementById('maskData');
  let start = null;
  let rect = null;

  const fit = () => {
    canvas.width = img.clientWidth;
    canvas.height = img.clientHeight;
  };
  img.complete ? fit() : img.addEventListener('load', fit);
  window.addEventListener('resize', () => { fit(); draw(); });

  const point = (e) => {
    const box = canvas.getBoundingClientRect();
    return { x: e.clientX - box.left, y: e.clientY - box.top };
  };

  const draw = () => {
    ctx.clearRect(0, 0, canvas.width, canvas.height);
    if (!rect) return;
    ctx.fillStyle = 'rgba(255, 255, 255, 0.5)';
    ctx.strokeStyle = '#e33';
    ctx.fillRect(rect.x, rect.y, rect.w, rect.h);
    ctx.strokeRect(rect.x, rect.y, rect.w, rect.h);
  };

  canvas.addEventListener('mousedown', (e) => { start = point(e); rect = null; });
  canvas.addEventListener('mousemove', (e) => {
    if (!start) return;
    const p = point(e);
    rect = { x: Math.min(start.x, p.x), y: Math.min(start.y, p.y), w: Math.abs(p.x - start.x), h: Math.abs(p.y - start.y) };
    draw();
  });
  window.addEventListener('mouseup', () => { start = null; });

  form.addEventListener('submit', (e) => {
    if (!rect) {
      e.preventDefault();
      alert('Drag a rectangle over the region to edit first.');
      return;
    }
    const sx = img.naturalWidth / canvas.width;
    const sy = img.naturalHeight / canvas.height;
    maskData.value = JSON.stringify({
      left: Math.round(rect.x * sx),
      top: Math.round(rect.y * sy),
      width: Math.round(rect.w * sx),
      height: Math.round(rect.h * sy),
    });
  });
});
"#;
