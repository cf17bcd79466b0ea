//! Embedded HTML/CSS/JS frontend for the citypulse web dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>CityPulse Dashboard</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --purple: #bc8cff;
  --cyan: #39d2c0;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app {
  max-width: 1280px;
  margin: 0 auto;
  padding: 24px;
}

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}

header h1 {
  font-size: 24px;
  font-weight: 600;
  display: flex;
  align-items: center;
  gap: 10px;
}

header h1 .logo { color: var(--accent); font-family: var(--mono); font-weight: 700; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.grid {
  display: grid;
  grid-template-columns: repeat(4, 1fr);
  gap: 12px;
  margin-bottom: 24px;
}

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 14px 16px;
}

.card .title { color: var(--text-muted); font-size: 12px; text-transform: uppercase; letter-spacing: .04em; }
.card .value { font-size: 22px; font-weight: 600; font-family: var(--mono); margin: 4px 0; }
.card .change { font-size: 12px; font-family: var(--mono); }
.card .change.up { color: var(--green); }
.card .change.down { color: var(--red); }

.bar { height: 4px; background: var(--border); border-radius: 2px; margin-top: 8px; overflow: hidden; }
.bar .fill { height: 100%; border-radius: 2px; transition: width .4s; }
.fill.normal { background: var(--green); }
.fill.warning { background: var(--yellow); }
.fill.critical { background: var(--red); }

.columns { display: grid; grid-template-columns: 1.2fr .8fr; gap: 16px; }

section h2 {
  font-size: 15px;
  font-weight: 600;
  margin-bottom: 10px;
  color: var(--text);
}

/* Chat */
.chat {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  display: flex;
  flex-direction: column;
  height: 520px;
}

.chat-log { flex: 1; overflow-y: auto; padding: 16px; }

.msg { margin-bottom: 12px; max-width: 85%; }
.msg.user { margin-left: auto; text-align: right; }
.msg .bubble {
  display: inline-block;
  padding: 8px 12px;
  border-radius: var(--radius);
  background: #1f2630;
  text-align: left;
  white-space: pre-wrap;
}
.msg.user .bubble { background: #1f3a5f; }
.msg .meta { color: var(--text-muted); font-size: 11px; margin-top: 2px; }

.attachment {
  margin-top: 8px;
  border-top: 1px solid var(--border);
  padding-top: 8px;
  font-size: 12px;
}
.attachment .label { color: var(--text-muted); text-transform: uppercase; font-size: 10px; letter-spacing: .05em; }
.attachment ul { list-style: none; margin: 2px 0 6px; }
.attachment li { padding: 1px 0; }
.attachment .trend-up { color: var(--red); }
.attachment .trend-down { color: var(--green); }

.typing { color: var(--text-muted); font-style: italic; font-size: 12px; padding: 0 16px 8px; display: none; }
.typing.on { display: block; }

.chat-input { display: flex; gap: 8px; padding: 12px 16px; border-top: 1px solid var(--border); }
.chat-input input {
  flex: 1;
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  color: var(--text);
  padding: 8px 12px;
  font-family: var(--font);
  font-size: 14px;
}
.chat-input input:focus { outline: none; border-color: var(--accent); }
.chat-input button {
  background: var(--accent);
  color: #0d1117;
  border: none;
  border-radius: var(--radius);
  padding: 8px 16px;
  font-weight: 600;
  cursor: pointer;
}
.chat-input button:disabled { opacity: .5; cursor: default; }

.quick { display: flex; flex-wrap: wrap; gap: 6px; padding: 0 16px 12px; }
.quick button {
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 999px;
  color: var(--text-muted);
  padding: 4px 12px;
  font-size: 12px;
  cursor: pointer;
}
.quick button:hover { border-color: var(--accent); color: var(--text); }

/* Alerts + sensors */
.alert {
  background: var(--surface);
  border: 1px solid var(--border);
  border-left: 3px solid var(--yellow);
  border-radius: var(--radius);
  padding: 10px 14px;
  margin-bottom: 10px;
}
.alert.high, .alert.critical { border-left-color: var(--red); }
.alert.medium { border-left-color: var(--yellow); }
.alert .head { display: flex; justify-content: space-between; font-weight: 600; }
.alert .where { color: var(--text-muted); font-size: 12px; }
.alert .desc { font-size: 13px; margin-top: 4px; }

table.sensors { width: 100%; border-collapse: collapse; font-family: var(--mono); font-size: 12px; }
table.sensors th { text-align: left; color: var(--text-muted); font-weight: 500; padding: 6px 8px; border-bottom: 1px solid var(--border); }
table.sensors td { padding: 6px 8px; border-bottom: 1px solid var(--border); }
.dot { display: inline-block; width: 8px; height: 8px; border-radius: 50%; margin-right: 6px; }
.dot.normal { background: var(--green); }
.dot.warning { background: var(--yellow); }
.dot.error { background: var(--red); }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1><span class="logo">◉</span> CityPulse <span class="subtitle">urban intelligence dashboard</span></h1>
    <div class="subtitle" id="clock"></div>
  </header>

  <div class="grid" id="metrics"></div>

  <div class="columns">
    <section>
      <h2>AI Assistant</h2>
      <div class="chat">
        <div class="chat-log" id="chat-log"></div>
        <div class="typing" id="typing">Assistant is thinking…</div>
        <div class="quick" id="quick"></div>
        <div class="chat-input">
          <input id="query" placeholder="Ask about traffic, safety, planning, transit…" autocomplete="off">
          <button id="send">Send</button>
        </div>
      </div>
    </section>
    <section>
      <h2>Public Safety</h2>
      <div id="alerts"></div>
      <h2 style="margin-top:16px">Sensor Board</h2>
      <table class="sensors">
        <thead><tr><th>Location</th><th>Noise</th><th>Crowd</th><th>Flow</th><th>Status</th></tr></thead>
        <tbody id="sensors"></tbody>
      </table>
    </section>
  </div>
</div>

<script>
const $ = id => document.getElementById(id);

function esc(s) {
  return String(s).replace(/[&<>"]/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;'}[c]));
}

// --- Metric cards -----------------------------------------------------------

async function loadMetrics() {
  const res = await fetch('/api/metrics');
  const data = await res.json();
  $('metrics').innerHTML = data.metrics.map(m => {
    const dir = m.percent_change >= 0 ? 'up' : 'down';
    const sign = m.percent_change >= 0 ? '+' : '';
    return `<div class="card">
      <div class="title">${esc(m.title)}</div>
      <div class="value">${esc(m.display_value)}</div>
      <div class="change ${dir}">${sign}${m.percent_change.toFixed(1)}%</div>
      <div class="bar"><div class="fill ${m.status}" style="width:${m.progress_percent}%"></div></div>
    </div>`;
  }).join('');
}

// --- Sensors + alerts -------------------------------------------------------

async function loadSensors() {
  const res = await fetch('/api/sensors');
  const data = await res.json();
  $('sensors').innerHTML = data.sensors.map(s => `<tr>
    <td>${esc(s.location)}</td>
    <td>${Math.round(s.noise_level)} dB</td>
    <td>${Math.round(s.crowd_density)}</td>
    <td>${Math.round(s.traffic_flow)}%</td>
    <td><span class="dot ${s.status}"></span>${s.status}</td>
  </tr>`).join('');
}

async function loadAlerts() {
  const res = await fetch('/api/alerts');
  const data = await res.json();
  $('alerts').innerHTML = data.alerts.map(a => `<div class="alert ${a.severity}">
    <div class="head"><span>${esc(a.title)}</span><span class="where">${a.minutes_ago} min ago</span></div>
    <div class="where">${esc(a.location)} · ${esc(a.state)}</div>
    <div class="desc">${esc(a.description)}</div>
  </div>`).join('');
}

// --- Chat -------------------------------------------------------------------

function renderAttachment(at) {
  if (!at) return '';
  let html = '<div class="attachment">';
  if (at.locations.length) {
    html += '<div class="label">Affected locations</div><ul>' +
      at.locations.map(l => `<li>· ${esc(l)}</li>`).join('') + '</ul>';
  }
  if (at.metrics.length) {
    html += '<div class="label">Key metrics</div><ul>' +
      at.metrics.map(m => {
        const cls = m.trend === 'up' ? 'trend-up' : 'trend-down';
        const arrow = m.trend === 'up' ? '↑' : '↓';
        return `<li>${esc(m.label)}: ${esc(m.value)} <span class="${cls}">${arrow}</span></li>`;
      }).join('') + '</ul>';
  }
  if (at.recommendations.length) {
    html += '<div class="label">Recommendations</div><ul>' +
      at.recommendations.map(r => `<li>→ ${esc(r)}</li>`).join('') + '</ul>';
  }
  return html + '</div>';
}

function renderMessages(messages) {
  $('chat-log').innerHTML = messages.map(m => `<div class="msg ${m.role}">
    <div class="bubble">${esc(m.text)}${renderAttachment(m.attachment)}</div>
    <div class="meta">${new Date(m.sent_at).toLocaleTimeString()}</div>
  </div>`).join('');
  $('chat-log').scrollTop = $('chat-log').scrollHeight;
}

async function loadChat() {
  const res = await fetch('/api/chat');
  const data = await res.json();
  renderMessages(data.messages);
}

async function send() {
  const input = $('query');
  const query = input.value.trim();
  if (!query) return;

  input.value = '';
  $('send').disabled = true;
  $('typing').classList.add('on');

  try {
    const res = await fetch('/api/chat', {
      method: 'POST',
      headers: {'Content-Type': 'application/json'},
      body: JSON.stringify({query}),
    });
    if (res.status === 409) return;  // reply already in flight
    await loadChat();
  } finally {
    $('send').disabled = false;
    $('typing').classList.remove('on');
  }
}

async function loadQuickQueries() {
  const res = await fetch('/api/quick-queries');
  const data = await res.json();
  $('quick').innerHTML = data.quick_queries.map(q =>
    `<button data-query="${esc(q.query)}">${esc(q.title)}</button>`).join('');
  $('quick').querySelectorAll('button').forEach(btn => {
    btn.addEventListener('click', () => {
      $('query').value = btn.dataset.query;
      send();
    });
  });
}

// --- Boot -------------------------------------------------------------------

$('send').addEventListener('click', send);
$('query').addEventListener('keydown', e => { if (e.key === 'Enter') send(); });

function tickClock() {
  $('clock').textContent = new Date().toLocaleString();
}

loadMetrics();
loadSensors();
loadAlerts();
loadChat();
loadQuickQueries();
tickClock();

setInterval(loadMetrics, 5000);
setInterval(loadSensors, 3000);
setInterval(tickClock, 1000);
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_is_a_complete_document() {
        assert!(INDEX_HTML.starts_with("<!DOCTYPE html>"));
        assert!(INDEX_HTML.contains("</html>"));
    }

    #[test]
    fn frontend_references_the_api_endpoints() {
        for endpoint in [
            "/api/metrics",
            "/api/sensors",
            "/api/alerts",
            "/api/chat",
            "/api/quick-queries",
        ] {
            assert!(INDEX_HTML.contains(endpoint), "missing {endpoint}");
        }
    }
}
