use crate::models::StatsResponse;
use crate::schedule::Schedule;
use crate::view::ViewState;

pub fn render_index(
    schedule: &Schedule,
    view: &ViewState,
    stats: &StatsResponse,
    active_day: &str,
) -> String {
    fill(
        INDEX_HTML,
        &[
            ("TOTAL", stats.total_tasks.to_string()),
            ("COMPLETED", stats.completed_tasks.to_string()),
            ("RATE", stats.completion_rate.to_string()),
            ("CURRENT_DAY", stats.current_day.to_string()),
            ("DAYS_LEFT", stats.days_left.to_string()),
            ("PROGRESS", stats.progress_percentage.clone()),
            ("PROGRESS_TEXT", escape(&stats.progress_text)),
            ("NAV", render_nav(schedule, active_day)),
            ("DAYS", render_days(schedule, view, active_day)),
        ],
    )
}

/// Substitutes `{{KEY}}` placeholders in one pass; inserted values are never rescanned.
fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn render_nav(schedule: &Schedule, active_day: &str) -> String {
    schedule
        .days
        .iter()
        .map(|day| {
            let active = if day.id == active_day { " active" } else { "" };
            format!(
                r#"<button class="nav-day{active}" type="button" data-day="{id}">{label}</button>"#,
                id = escape(&day.id),
                label = escape(&day.label),
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ")
}

fn render_days(schedule: &Schedule, view: &ViewState, active_day: &str) -> String {
    let mut html = String::new();
    for day in &schedule.days {
        let active = if day.id == active_day { " active" } else { "" };
        html.push_str(&format!(
            r#"<section class="day-content{active}" id="day-{id}">"#,
            id = escape(&day.id)
        ));
        for task in &day.tasks {
            let done = view.is_completed(&task.id);
            let (class, icon) = if done {
                (" completed", ICON_DONE)
            } else {
                ("", ICON_OPEN)
            };
            let id = escape(&task.id);
            let action = escape(&urlencoding::encode(&task.id));
            html.push_str(&format!(
                r#"
        <div class="schedule-item{class}">
          <span class="time">{time}</span>
          <div class="task">
            <span class="title">{title}</span>
            <span class="detail">{detail}</span>
          </div>
          <form method="post" action="/tasks/{action}/toggle">
            <button class="check-button{class}" type="submit" data-task-id="{id}" aria-pressed="{done}">{icon}</button>
          </form>
        </div>"#,
                time = escape(&task.time),
                title = escape(&task.title),
                detail = escape(&task.detail),
            ));
        }
        html.push_str("\n      </section>\n      ");
    }
    html
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const ICON_DONE: &str = "&#10004;";
const ICON_OPEN: &str = "&#9675;";

pub const SERVICE_WORKER_JS: &str = r#"const CACHE = 'routine-90-v1';
const OFFLINE_URLS = ['/', '/manifest.json'];

self.addEventListener('install', (event) => {
  event.waitUntil(caches.open(CACHE).then((cache) => cache.addAll(OFFLINE_URLS)));
});

self.addEventListener('activate', (event) => {
  event.waitUntil(
    caches.keys().then((keys) =>
      Promise.all(keys.filter((key) => key !== CACHE).map((key) => caches.delete(key)))
    )
  );
});

self.addEventListener('fetch', (event) => {
  if (event.request.method !== 'GET') {
    return;
  }
  event.respondWith(
    fetch(event.request)
      .then((response) => {
        const copy = response.clone();
        caches.open(CACHE).then((cache) => cache.put(event.request, copy));
        return response;
      })
      .catch(() => caches.match(event.request))
  );
});
"#;

pub const MANIFEST_JSON: &str = r##"{
  "name": "90-Day Routine",
  "short_name": "Routine",
  "start_url": "/",
  "display": "standalone",
  "background_color": "#f8f3e6",
  "theme_color": "#2f4858"
}
"##;

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <meta name="theme-color" content="#2f4858" />
  <link rel="manifest" href="/manifest.json" />
  <title>90-Day Routine</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --done: #2d7a4b;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    html.standalone body {
      padding-top: 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .progress-track {
      height: 12px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.1);
      overflow: hidden;
    }

    #globalProgress {
      height: 100%;
      background: var(--accent);
      transition: width 300ms ease;
    }

    .nav {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    .nav-day {
      border: none;
      background: transparent;
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      color: #6b645d;
      cursor: pointer;
    }

    .nav-day.active {
      background: white;
      color: var(--accent-2);
    }

    .day-content {
      display: none;
      gap: 12px;
    }

    .day-content.active {
      display: grid;
    }

    .schedule-item {
      display: grid;
      grid-template-columns: 64px 1fr auto;
      align-items: center;
      gap: 12px;
      background: white;
      border-radius: 16px;
      padding: 14px 18px;
    }

    .schedule-item.completed .title {
      text-decoration: line-through;
      color: #8b857d;
    }

    .schedule-item .detail {
      display: block;
      font-size: 0.85rem;
      color: #8b857d;
    }

    .schedule-item form {
      margin: 0;
    }

    .check-button {
      border: 2px solid var(--accent-2);
      background: white;
      color: var(--accent-2);
      border-radius: 999px;
      width: 40px;
      height: 40px;
      font-size: 1.1rem;
      cursor: pointer;
    }

    .check-button.completed {
      background: var(--done);
      border-color: var(--done);
      color: white;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>90-Day Routine</h1>
      <p id="progressText">{{PROGRESS_TEXT}}</p>
      <div class="progress-track"><div id="globalProgress" style="width: {{PROGRESS}}%"></div></div>
    </header>

    <section class="panel">
      <div class="stat">
        <span class="label">Current day</span>
        <span id="currentDay" class="value">{{CURRENT_DAY}}</span>
      </div>
      <div class="stat">
        <span class="label">Days left</span>
        <span id="daysLeft" class="value">{{DAYS_LEFT}}</span>
      </div>
      <div class="stat">
        <span class="label">Completed</span>
        <span class="value"><span id="completedTasks">{{COMPLETED}}</span> / <span id="totalTasks">{{TOTAL}}</span></span>
      </div>
      <div class="stat">
        <span class="label">Success rate</span>
        <span id="successRate" class="value">{{RATE}}%</span>
      </div>
    </section>

    <nav class="nav">
        {{NAV}}
    </nav>

    <div class="days">
      {{DAYS}}
    </div>
  </main>

  <script>
    const ICON_DONE = '✔';
    const ICON_OPEN = '○';

    const renderStats = (stats) => {
      document.getElementById('totalTasks').textContent = stats.total_tasks;
      document.getElementById('completedTasks').textContent = stats.completed_tasks;
      document.getElementById('successRate').textContent = `${stats.completion_rate}%`;
      document.getElementById('currentDay').textContent = stats.current_day;
      document.getElementById('daysLeft').textContent = stats.days_left;
      document.getElementById('globalProgress').style.width = `${stats.progress_percentage}%`;
      document.getElementById('progressText').textContent = stats.progress_text;
    };

    const setCompleted = (button, completed) => {
      button.classList.toggle('completed', completed);
      button.closest('.schedule-item').classList.toggle('completed', completed);
      button.setAttribute('aria-pressed', String(completed));
      button.textContent = completed ? ICON_DONE : ICON_OPEN;
    };

    const saveToggle = async (taskId, completed) => {
      const res = await fetch('/api/progress', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ task_id: taskId, completed })
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      const body = await res.json();
      renderStats(body.stats);
    };

    document.querySelectorAll('.check-button').forEach((button) => {
      button.addEventListener('click', (event) => {
        event.preventDefault();
        const completed = !button.classList.contains('completed');
        setCompleted(button, completed);
        saveToggle(button.dataset.taskId, completed).catch((err) => console.error(err));
      });
    });

    document.querySelectorAll('.nav-day').forEach((tab) => {
      tab.addEventListener('click', () => {
        document.querySelectorAll('.nav-day').forEach((other) => other.classList.remove('active'));
        document.querySelectorAll('.day-content').forEach((section) => section.classList.remove('active'));
        tab.classList.add('active');
        const section = document.getElementById(`day-${tab.dataset.day}`);
        if (section) {
          section.classList.add('active');
        }
      });
    });

    if ('serviceWorker' in navigator) {
      window.addEventListener('load', () => {
        navigator.serviceWorker.register('/sw.js').then(
          (registration) => console.log('service worker registered with scope', registration.scope),
          (err) => console.log('service worker registration failed', err)
        );
      });
    }

    const isStandalone = () =>
      window.matchMedia('(display-mode: standalone)').matches ||
      window.navigator.standalone === true ||
      document.referrer.includes('android-app://');

    if (isStandalone()) {
      document.documentElement.classList.add('standalone');
    }
  </script>
</body>
</html>
"##;
