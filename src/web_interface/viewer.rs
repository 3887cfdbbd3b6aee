//! HTML gallery served at `/admin/viewer`.

use chrono::Local;

use crate::storage::Capture;
use crate::web_interface::types::png_data_url;

const STYLE: &str = r#"
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
           background: #1a1a2e; color: #eee; min-height: 100vh; padding: 2rem; }
    header { max-width: 1400px; margin: 0 auto 2rem; display: flex;
             justify-content: space-between; align-items: center; }
    h1 { font-size: 1.5rem; color: #fff; }
    .count { color: #888; font-size: 0.9rem; }
    .grid { max-width: 1400px; margin: 0 auto; display: grid;
            grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 1.5rem; }
    .card { background: #16213e; border-radius: 12px; overflow: hidden;
            transition: transform 0.2s, box-shadow 0.2s; }
    .card:hover { transform: translateY(-4px); box-shadow: 0 8px 30px rgba(0,0,0,0.3); }
    .card img { width: 100%; height: 200px; object-fit: cover; cursor: pointer; background: #0f0f23; }
    .card-info { padding: 1rem; }
    .filename { font-size: 0.85rem; color: #fff; word-break: break-all; margin-bottom: 0.5rem; }
    .meta { display: flex; justify-content: space-between; font-size: 0.75rem; color: #888; }
    .card-actions { padding: 0 1rem 1rem; }
    .delete-btn { width: 100%; padding: 0.5rem; background: #dc3545; color: #fff; border: none;
                  border-radius: 6px; cursor: pointer; font-size: 0.8rem; }
    .delete-btn:hover { background: #c82333; }
    .delete-btn:disabled { background: #666; cursor: not-allowed; }
    .empty { text-align: center; color: #666; padding: 4rem; grid-column: 1 / -1; }
    .modal { display: none; position: fixed; inset: 0; background: rgba(0,0,0,0.9); z-index: 1000;
             justify-content: center; align-items: center; padding: 2rem; }
    .modal.active { display: flex; }
    .modal img { max-width: 100%; max-height: 100%; object-fit: contain; }
    .modal-close { position: fixed; top: 1rem; right: 1rem; background: none; border: none;
                   color: #fff; font-size: 2rem; cursor: pointer; }
"#;

const SCRIPT: &str = r#"
    const modal = document.querySelector('.modal');
    const modalImg = modal.querySelector('img');
    function openModal(src) { modalImg.src = src; modal.classList.add('active'); }
    function closeModal() { modal.classList.remove('active'); }
    document.addEventListener('keydown', (e) => { if (e.key === 'Escape') closeModal(); });
    function countLabel(n) { return n + ' capture' + (n !== 1 ? 's' : ''); }
    async function deleteCapture(btn) {
      const card = btn.closest('.card');
      const filename = card.dataset.filename;
      if (!confirm('Are you sure you want to delete this capture?')) return;
      btn.disabled = true;
      btn.textContent = 'Deleting...';
      try {
        const res = await fetch('/admin/captures/' + encodeURIComponent(filename), { method: 'DELETE' });
        if (res.ok) {
          card.style.transition = 'opacity 0.3s, transform 0.3s';
          card.style.opacity = '0';
          card.style.transform = 'scale(0.9)';
          setTimeout(() => {
            card.remove();
            const count = document.querySelectorAll('.card').length;
            document.querySelector('.count').textContent = countLabel(count);
            if (count === 0) {
              document.querySelector('.grid').innerHTML = '<div class="empty">No captures yet</div>';
            }
          }, 300);
        } else {
          const data = await res.json();
          alert('Failed to delete: ' + (data.error || 'Unknown error'));
          btn.disabled = false;
          btn.textContent = 'Delete';
        }
      } catch (err) {
        alert('Failed to delete: ' + err.message);
        btn.disabled = false;
        btn.textContent = 'Delete';
      }
    }
"#;

/// Renders the gallery page for `captures`, in the order given.
pub fn render_viewer(captures: &[Capture]) -> String {
    let cards = if captures.is_empty() {
        r#"<div class="empty">No captures yet</div>"#.to_string()
    } else {
        captures.iter().map(render_card).collect::<Vec<_>>().join("\n")
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Captures Viewer</title>
  <style>{style}</style>
</head>
<body>
  <header>
    <h1>Captures Viewer</h1>
    <span class="count">{count}</span>
  </header>
  <div class="grid">
{cards}
  </div>
  <div class="modal" onclick="closeModal()">
    <button class="modal-close" onclick="closeModal()">&times;</button>
    <img src="" alt="Full size">
  </div>
  <script>{script}</script>
</body>
</html>"#,
        style = STYLE,
        count = count_label(captures.len()),
        cards = cards,
        script = SCRIPT,
    )
}

fn render_card(capture: &Capture) -> String {
    let name = escape_html(&capture.filename);
    let created = capture
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");
    format!(
        r#"    <div class="card" data-filename="{name}">
      <img src="{url}" alt="{name}" onclick="openModal(this.src)">
      <div class="card-info">
        <div class="filename">{name}</div>
        <div class="meta">
          <span>{size}</span>
          <span>{created}</span>
        </div>
      </div>
      <div class="card-actions">
        <button class="delete-btn" onclick="deleteCapture(this)">Delete</button>
      </div>
    </div>"#,
        name = name,
        url = png_data_url(&capture.content),
        size = format_bytes(capture.size_bytes),
        created = created,
    )
}

pub fn count_label(count: usize) -> String {
    format!("{} capture{}", count, if count == 1 { "" } else { "s" })
}

/// `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

pub fn escape_html(raw: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn capture(name: &str) -> Capture {
        Capture {
            filename: name.to_string(),
            size_bytes: 2048,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            content: b"hello".to_vec(),
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2.0 MB");
    }

    #[test]
    fn test_count_label() {
        assert_eq!(count_label(0), "0 captures");
        assert_eq!(count_label(1), "1 capture");
        assert_eq!(count_label(2), "2 captures");
    }

    #[test]
    fn test_empty_gallery() {
        let html = render_viewer(&[]);
        assert_eq!(html.matches("No captures yet").count(), 2);
        assert!(html.contains("0 captures"));
    }

    #[test]
    fn test_cards_embed_data_urls() {
        let html = render_viewer(&[capture("img_01012024120000.png")]);
        assert!(html.contains("1 capture<"));
        assert!(html.contains(r#"data-filename="img_01012024120000.png""#));
        assert!(html.contains("data:image/png;base64,aGVsbG8="));
        assert!(html.contains("2.0 KB"));
        // only the client-side empty state in the script remains
        assert_eq!(html.matches("No captures yet").count(), 1);
    }

    #[test]
    fn test_filenames_are_escaped() {
        let html = render_viewer(&[capture("<script>alert('x')</script>.png")]);
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;.png"));
    }
}
