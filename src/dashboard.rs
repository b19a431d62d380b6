//! Self-contained HTML page for a [`Dashboard`]: the computed data is embedded
//! as JSON and drawn client-side with inline CSS bars and SVG lines, so the
//! file can be opened directly without a server or network access.

use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::pipeline::{Outcome, NO_DATA};

const DATA_MARKER: &str = "__DASHBOARD_DATA__";

/// Renders the page. An empty outcome produces the same page with only the message.
pub fn render_html(outcome: &Outcome) -> Result<String> {
    let payload = match outcome {
        Outcome::Ready(dashboard) => json!({ "dashboard": dashboard }),
        Outcome::Empty { error } => json!({ "empty": NO_DATA, "error": error }),
    };
    let blob = serde_json::to_string(&payload).context("serializing dashboard")?;
    // keep the blob from closing the surrounding <script>
    let blob = blob.replace("</", "<\\/");
    Ok(TEMPLATE.replace(DATA_MARKER, &blob))
}

pub fn write_html(outcome: &Outcome, path: &Path) -> Result<usize> {
    let html = render_html(outcome)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, &html).with_context(|| format!("writing {}", path.display()))?;
    Ok(html.len())
}

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>My Daily Study Routine</title>
  <style>
    :root {
      --bg: #0d1117; --bg-raised: #161b22; --bg-inset: #010409;
      --fg: #c9d1d9; --fg-muted: #8b949e; --fg-bright: #f0f6fc;
      --orange: #ffa500; --blue: #4169e1; --green: #3fb950;
      --morning: #FFA07A; --afternoon: #20B2AA; --night: #8A2BE2;
      --border: #30363d;
      --mono: 'JetBrains Mono', 'Fira Code', 'SF Mono', monospace;
      --sans: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
      --radius: 8px;
    }
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: var(--sans); background: var(--bg); color: var(--fg); line-height: 1.5; }
    main { max-width: 1280px; margin: 0 auto; padding: 1.5rem; }
    h1 { color: var(--fg-bright); font-size: 1.6rem; margin-bottom: 0.2rem; }
    h2 { color: var(--fg-bright); font-size: 1.05rem; border-bottom: 1px solid var(--border); padding-bottom: 0.4rem; margin: 2rem 0 0.8rem; }
    .sub { color: var(--fg-muted); font-family: var(--mono); font-size: 0.8rem; }
    .grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 0.65rem; }
    .card { background: var(--bg-raised); border: 1px solid var(--border); border-top: 3px solid var(--orange); border-radius: var(--radius); padding: 0.75rem 0.9rem; }
    .card-label { font-size: 0.72rem; color: var(--fg-muted); text-transform: uppercase; letter-spacing: 0.04em; }
    .card-val { font-size: 1.5rem; font-weight: 700; color: var(--fg-bright); font-family: var(--mono); }
    .card-detail { font-size: 0.7rem; color: var(--fg-muted); }
    .today-total { font-size: 3rem; color: var(--orange); font-family: var(--mono); font-weight: 700; }
    .bar-row { display: flex; align-items: center; gap: 0.6rem; padding: 0.2rem 0; }
    .bar-label { min-width: 140px; font-size: 0.75rem; text-align: right; color: var(--fg-muted); font-family: var(--mono); }
    .bar-track { flex: 1; height: 18px; background: var(--bg-inset); border-radius: 4px; overflow: hidden; }
    .bar-seg { height: 100%; background: var(--orange); }
    .bar-val { font-family: var(--mono); font-size: 0.72rem; min-width: 60px; color: var(--fg-muted); }
    .tabs { display: flex; gap: 0.4rem; margin-bottom: 0.6rem; }
    .tab { background: var(--bg-raised); color: var(--fg-muted); border: 1px solid var(--border); border-radius: 4px; padding: 0.25rem 0.7rem; cursor: pointer; font-size: 0.75rem; }
    .tab.active { color: var(--fg-bright); border-color: var(--orange); }
    svg { width: 100%; height: 320px; background: var(--bg-raised); border: 1px solid var(--border); border-radius: var(--radius); }
    .empty { color: var(--fg-muted); font-style: italic; padding: 0.5rem 0; }
    .error { color: #f85149; background: var(--bg-raised); border: 1px solid #f85149; border-radius: var(--radius); padding: 0.6rem 0.9rem; margin-top: 1rem; }
  </style>
</head>
<body>
<main id="app"></main>
<script>
const DATA = __DASHBOARD_DATA__;

const el = (tag, attrs, ...children) => {
  const node = document.createElement(tag);
  Object.entries(attrs || {}).forEach(([k, v]) => k === 'class' ? node.className = v : node.setAttribute(k, v));
  children.flat().forEach(c => node.append(c instanceof Node ? c : document.createTextNode(String(c))));
  return node;
};
const fmt = n => (n === null || n === undefined) ? '-' : Number(n).toFixed(2);
const card = (label, value, detail) => el('div', { class: 'card' },
  el('div', { class: 'card-label' }, label),
  el('div', { class: 'card-val' }, value),
  detail ? el('div', { class: 'card-detail' }, detail) : []);
const empty = text => el('div', { class: 'empty' }, text || 'Nothing to show for this selection.');

function bars(rows, label, value, color) {
  if (!rows.length) return empty();
  const max = Math.max(...rows.map(value), 0) || 1;
  return rows.map(r => el('div', { class: 'bar-row' },
    el('div', { class: 'bar-label' }, label(r)),
    el('div', { class: 'bar-track' },
      el('div', { class: 'bar-seg', style: `width:${(value(r) / max * 100).toFixed(1)}%;background:${color ? color(r) : ''}` })),
    el('div', { class: 'bar-val' }, fmt(value(r)))));
}

function line(points, color) {
  const pts = points.filter(p => p.y !== null && p.y !== undefined);
  const ns = 'http://www.w3.org/2000/svg';
  const svg = document.createElementNS(ns, 'svg');
  svg.setAttribute('viewBox', '0 0 1000 320');
  svg.setAttribute('preserveAspectRatio', 'none');
  if (pts.length < 1) return svg;
  const max = Math.max(...pts.map(p => p.y), 0) || 1;
  const x = i => 20 + (points.length > 1 ? i / (points.length - 1) : 0.5) * 960;
  const y = v => 300 - (v / max) * 280;
  const path = document.createElementNS(ns, 'polyline');
  path.setAttribute('fill', 'none');
  path.setAttribute('stroke', color);
  path.setAttribute('stroke-width', '3');
  path.setAttribute('points', points.map((p, i) => p.y === null ? null : `${x(i)},${y(p.y)}`).filter(Boolean).join(' '));
  svg.append(path);
  return svg;
}

const TOD_COLORS = { Morning: 'var(--morning)', Afternoon: 'var(--afternoon)', Night: 'var(--night)' };
const app = document.getElementById('app');
app.append(el('h1', {}, 'My Daily Study Routine'));

if (DATA.empty) {
  if (DATA.error) app.append(el('p', { class: 'error' }, DATA.error));
  app.append(el('p', { class: 'empty' }, DATA.empty));
} else {
  const d = DATA.dashboard;
  app.append(el('div', { class: 'sub' }, `as of ${d.today} · source ${d.source_sha256.slice(0, 12)}`));

  if (d.today_breakdown) {
    app.append(el('h2', {}, "Today's Study Hours by Subject"),
      el('div', { class: 'today-total' }, `${fmt(d.today_breakdown.total_hours)} Hours`),
      bars(d.today_breakdown.subjects, r => r.study, r => r.hours));
  }

  const s = d.summary;
  app.append(el('h2', {}, '- Total Hours Studied -'), el('div', { class: 'grid' },
    card('Total Hours', `${fmt(s.total_hours)} Hours`),
    card('Total time (in days)', `${fmt(s.total_days_equivalent)} Days`),
    card('Record Day', s.record_day ? `${fmt(s.record_day.hours)} Hours` : '-', s.record_day ? `On ${s.record_day.date}` : ''),
    card('Started on', s.started_on || '-'),
    card('Longest Study Streak', `${d.streaks.longest} Days`),
    card('Current Study Streak', `${d.streaks.current} Days`),
    card('Distinct Days Studied', `${s.distinct_study_days} Days`),
    card('No study days', `${s.no_study_days} Days`)));

  const chart = el('div', {});
  const views = {
    'Total Hours': () => line(d.daily.map(p => ({ y: p.hours })), 'var(--orange)'),
    'Rolling Volatility': () => line(d.daily.map(p => ({ y: p.volatility })), 'var(--blue)'),
    'Weekly Average': () => bars(d.weekly, w => w.week_start, w => w.mean_hours),
  };
  const tabs = el('div', { class: 'tabs' });
  const show = name => {
    chart.replaceChildren(views[name]());
    [...tabs.children].forEach(t => t.classList.toggle('active', t.textContent === name));
  };
  Object.keys(views).forEach(name => {
    const t = el('button', { class: 'tab' }, name);
    t.addEventListener('click', () => show(name));
    tabs.append(t);
  });
  app.append(el('h2', {}, 'Daily Trend'), tabs, chart);
  show('Total Hours');

  app.append(el('h2', {}, 'Total Hours by Subject'), bars(d.subjects, r => r.study, r => r.hours));
  app.append(el('h2', {}, `Top ${d.params.top_n} Subjects Studied in the Last ${d.params.recent_days} Days`),
    bars(d.top_recent, r => r.study, r => r.hours));

  const period = d.params.period.kind === 'entire' ? 'Entire Period' : `Last ${d.params.period.days} Days`;
  app.append(el('h2', {}, `Insights · ${period}`),
    el('div', { class: 'sub' }, 'Average Study Hours by Day of the Week'),
    bars(d.weekdays, w => w.weekday, w => w.average_hours));
  app.append(el('h2', {}, 'Study Hours Distribution by Time of Day'),
    bars(d.tod_totals, t => t.tod, t => t.hours, t => TOD_COLORS[t.tod]));
  app.append(el('h2', {}, `Study Hours for ${d.params.tod}`),
    bars(d.tod_subjects, r => r.study, r => r.hours, () => TOD_COLORS[d.params.tod]));
}
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::from_csv;
    use crate::views::ViewParams;
    use chrono::NaiveDate;

    #[test]
    fn embeds_dashboard_json() {
        let csv = "Full_Date,Study,Hours,Tod\n2024-10-16,</script>Math,2,Night\n";
        let today = NaiveDate::from_ymd_opt(2024, 10, 16).unwrap();
        let d = from_csv(csv, &ViewParams::default(), today).unwrap();
        let html = render_html(&Outcome::Ready(Box::new(d))).unwrap();
        assert!(!html.contains(DATA_MARKER));
        assert!(html.contains("\"longest\":1"));
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn empty_page_carries_message() {
        let html = render_html(&Outcome::no_data()).unwrap();
        assert!(html.contains("\"empty\":\"No data available.\""));
        assert!(html.contains("\"error\":null"));
    }

    #[test]
    fn failed_page_carries_error_and_message() {
        let html = render_html(&Outcome::failed("Failed to fetch data: boom".to_string())).unwrap();
        assert!(html.contains("\"error\":\"Failed to fetch data: boom\""));
        assert!(html.contains("\"empty\":\"No data available.\""));
    }

    #[test]
    fn writes_into_missing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out").join("index.html");
        let written = write_html(
            &Outcome::no_data(),
            &path,
        )
        .unwrap();
        assert!(written > 0);
        assert!(path.exists());
    }
}
