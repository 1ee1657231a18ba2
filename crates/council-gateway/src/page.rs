//! Browser chat page served at `/`.

/// Self-contained page: talks to `POST /api/chat` and polls `GET /api/stats`.
pub fn chat_page_html() -> &'static str {
    CHAT_PAGE
}

const CHAT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Council</title>
<style>
  :root { --accent: #2f6f4f; --muted: #6b7280; --line: #e5e7eb; }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { font-family: system-ui, -apple-system, "Segoe UI", sans-serif; background: #f3f4f6; height: 100vh; display: flex; justify-content: center; }
  main { width: 100%; max-width: 760px; display: flex; flex-direction: column; background: #fff; border-left: 1px solid var(--line); border-right: 1px solid var(--line); }
  header { padding: 16px 20px; border-bottom: 1px solid var(--line); }
  header h1 { font-size: 18px; color: var(--accent); }
  #stats { font-size: 12px; color: var(--muted); margin-top: 4px; }
  #log { flex: 1; overflow-y: auto; padding: 20px; }
  .turn { margin-bottom: 14px; display: flex; }
  .turn.user { justify-content: flex-end; }
  .bubble { max-width: 75%; padding: 10px 14px; border-radius: 12px; white-space: pre-wrap; word-wrap: break-word; line-height: 1.45; }
  .user .bubble { background: var(--accent); color: #fff; }
  .council .bubble { background: #f9fafb; border: 1px solid var(--line); }
  .pending .bubble { color: var(--muted); font-style: italic; }
  form { display: flex; gap: 8px; padding: 14px 20px; border-top: 1px solid var(--line); }
  #question { flex: 1; padding: 10px 12px; border: 1px solid var(--line); border-radius: 8px; font-size: 14px; }
  button { padding: 10px 18px; border: 0; border-radius: 8px; background: var(--accent); color: #fff; cursor: pointer; }
  button:disabled { opacity: .5; cursor: default; }
</style>
</head>
<body>
<main>
  <header>
    <h1>Council</h1>
    <div id="stats">loading usage…</div>
  </header>
  <section id="log">
    <div class="turn council"><div class="bubble">Ask a question. It will be routed to the best-suited specialist.</div></div>
  </section>
  <form id="ask">
    <input id="question" type="text" autocomplete="off" placeholder="Your question">
    <button id="send" type="submit">Ask</button>
  </form>
</main>
<script>
  const log = document.getElementById('log');
  const input = document.getElementById('question');
  const send = document.getElementById('send');

  function append(kind, text) {
    const turn = document.createElement('div');
    turn.className = 'turn ' + kind;
    const bubble = document.createElement('div');
    bubble.className = 'bubble';
    bubble.textContent = text;
    turn.appendChild(bubble);
    log.appendChild(turn);
    log.scrollTop = log.scrollHeight;
    return turn;
  }

  async function refreshStats() {
    try {
      const s = await (await fetch('/api/stats')).json();
      document.getElementById('stats').textContent =
        'questions ' + s.question_count + ' · answers ' + s.answer_count +
        ' · tokens ' + s.total_tokens + ' · ' + s.total_duration.toFixed(1) + 's';
    } catch (e) {
      console.error('stats unavailable', e);
    }
  }

  document.getElementById('ask').addEventListener('submit', async (event) => {
    event.preventDefault();
    const message = input.value.trim();
    if (!message) return;

    input.value = '';
    input.disabled = send.disabled = true;
    append('user', message);
    const pending = append('council pending', 'thinking…');

    try {
      const res = await fetch('/api/chat', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ message }),
      });
      const data = await res.json();
      pending.remove();
      append('council', data.error ? 'Error: ' + data.error : data.answer);
      refreshStats();
    } catch (e) {
      pending.remove();
      append('council', 'Network error: ' + e.message);
    } finally {
      input.disabled = send.disabled = false;
      input.focus();
    }
  });

  refreshStats();
  setInterval(refreshStats, 5000);
  input.focus();
</script>
</body>
</html>
"#;
