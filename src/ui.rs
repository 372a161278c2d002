use crate::live::LiveSnapshot;
use crate::models::{AnalyticsResponse, ConnectionStatus};

pub fn render_index(
    snapshot: &LiveSnapshot,
    status: ConnectionStatus,
    analytics: &AnalyticsResponse,
) -> String {
    INDEX_HTML
        .replace("{{IN}}", &snapshot.counters.people_in.to_string())
        .replace("{{OUT}}", &snapshot.counters.people_out.to_string())
        .replace("{{INSIDE}}", &snapshot.counters.people_inside.to_string())
        .replace("{{STATUS}}", status_label(status))
        .replace("{{PEAK_DAY}}", &analytics.peak_day.day)
        .replace("{{PEAK_DAY_AVG}}", &analytics.peak_day.average.to_string())
        .replace("{{PEAK_HOUR}}", &analytics.peak_hour.hour)
        .replace("{{PEAK_HOUR_COUNT}}", &analytics.peak_hour.count.to_string())
}

fn status_label(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connecting => "connecting",
        ConnectionStatus::Connected => "connected",
        ConnectionStatus::Disconnected => "disconnected",
    }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Dashboard de Controle de Pessoas</title>
  <style>
    :root {
      --bg: #f3f4f6;
      --ink: #1f2937;
      --muted: #6b7280;
      --card: #ffffff;
      --bar: #8884d8;
      --peak: #ff7300;
      --line: #8884d8;
      --hour: #3b82f6;
      --grid: rgba(31, 41, 55, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 32px;
    }

    h1 {
      font-size: 1.9rem;
      margin: 0 0 32px;
    }

    .counters {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 24px;
      margin-bottom: 32px;
    }

    .charts {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(420px, 1fr));
      gap: 32px;
    }

    .card {
      background: var(--card);
      border-radius: 12px;
      border: 1px solid rgba(31, 41, 55, 0.08);
      box-shadow: 0 1px 3px rgba(31, 41, 55, 0.08);
      padding: 20px 24px;
    }

    .card .label {
      font-size: 0.875rem;
      font-weight: 500;
      color: var(--muted);
    }

    .card .value {
      display: block;
      margin-top: 8px;
      font-size: 1.6rem;
      font-weight: 700;
    }

    .card h2 {
      margin: 0 0 16px;
      font-size: 1.15rem;
    }

    svg {
      width: 100%;
      height: 300px;
      display: block;
    }

    .grid {
      stroke: var(--grid);
      stroke-dasharray: 3 3;
    }

    .axis-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .bar {
      fill: var(--bar);
    }

    .bar.peak {
      fill: var(--peak);
    }

    .series {
      fill: none;
      stroke: var(--line);
      stroke-width: 2;
    }

    .caption {
      margin: 16px 0 0;
      text-align: center;
      font-size: 0.875rem;
      font-weight: 500;
    }

    .caption .day {
      color: var(--peak);
      font-weight: 700;
    }

    .caption .hour {
      color: var(--hour);
      font-weight: 700;
    }

    .status {
      margin-top: 24px;
      font-size: 0.85rem;
      color: var(--muted);
    }

    .status[data-status="disconnected"] {
      color: #c63b2b;
    }

    .status[data-status="connected"] {
      color: #2d7a4b;
    }
  </style>
</head>
<body>
  <h1>Dashboard de Controle de Pessoas</h1>

  <section class="counters">
    <div class="card">
      <span class="label">Total de Entradas</span>
      <span id="people-in" class="value">{{IN}}</span>
    </div>
    <div class="card">
      <span class="label">Total de Saídas</span>
      <span id="people-out" class="value">{{OUT}}</span>
    </div>
    <div class="card">
      <span class="label">Pessoas no Estabelecimento</span>
      <span id="people-inside" class="value">{{INSIDE}}</span>
    </div>
  </section>

  <section class="charts">
    <div class="card">
      <h2>Média de Pessoas por Dia da Semana</h2>
      <svg id="daily-chart" viewBox="0 0 600 300" aria-label="Média diária" role="img"></svg>
      <p class="caption">
        Dia de pico: <span class="day">{{PEAK_DAY}}</span> com média de
        <span class="day">{{PEAK_DAY_AVG}}</span> pessoas
      </p>
    </div>
    <div class="card">
      <h2>Ocupação ao Longo do Dia</h2>
      <svg id="hourly-chart" viewBox="0 0 600 300" aria-label="Ocupação por hora" role="img"></svg>
      <p class="caption">
        Horário de pico: <span class="hour">{{PEAK_HOUR}}</span> com
        <span class="hour">{{PEAK_HOUR_COUNT}}</span> pessoas
      </p>
    </div>
  </section>

  <div class="status" id="status" data-status="{{STATUS}}">Conexão: {{STATUS}}</div>

  <script>
    const inEl = document.getElementById('people-in');
    const outEl = document.getElementById('people-out');
    const insideEl = document.getElementById('people-inside');
    const statusEl = document.getElementById('status');
    const dailyEl = document.getElementById('daily-chart');
    const hourlyEl = document.getElementById('hourly-chart');

    const width = 600;
    const height = 300;
    const paddingX = 44;
    const paddingY = 30;
    const paddingTop = 16;

    const scale = (values) => {
      const max = Math.max(...values, 1);
      const scaleY = (height - paddingTop - paddingY) / max;
      return { max, y: (value) => height - paddingY - value * scaleY };
    };

    const gridLines = (max, y) => {
      const ticks = 4;
      let out = '';
      for (let i = 0; i <= ticks; i += 1) {
        const value = Math.round((max * i) / ticks);
        const yPos = y(value);
        out += `<line class="grid" x1="${paddingX}" y1="${yPos}" x2="${width - paddingX}" y2="${yPos}" />`;
        out += `<text class="axis-label" x="${paddingX - 8}" y="${yPos + 4}" text-anchor="end">${value}</text>`;
      }
      return out;
    };

    const renderBars = (points) => {
      const { max, y } = scale(points.map((p) => p.average));
      const slot = (width - paddingX * 2) / points.length;
      const barWidth = slot * 0.7;
      const bars = points
        .map((point, index) => {
          const x = paddingX + index * slot + (slot - barWidth) / 2;
          const yPos = y(point.average);
          const cls = point.peak ? 'bar peak' : 'bar';
          return `<rect class="${cls}" x="${x}" y="${yPos}" width="${barWidth}" height="${height - paddingY - yPos}"><title>${point.day}: ${point.average}</title></rect>`
            + `<text class="axis-label" x="${x + barWidth / 2}" y="${height - paddingY + 16}" text-anchor="middle">${point.day}</text>`;
        })
        .join('');
      dailyEl.innerHTML = gridLines(max, y) + bars;
    };

    const renderLine = (points) => {
      const { max, y } = scale(points.map((p) => p.count));
      const step = points.length > 1 ? (width - paddingX * 2) / (points.length - 1) : 0;
      const x = (index) => paddingX + index * step;
      const path = points
        .map((point, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(point.count).toFixed(2)}`)
        .join(' ');
      const labels = points
        .map((point, index) => `<text class="axis-label" x="${x(index)}" y="${height - paddingY + 16}" text-anchor="middle">${point.hour}</text>`)
        .join('');
      hourlyEl.innerHTML = `${gridLines(max, y)}<path class="series" d="${path}" />${labels}`;
    };

    const loadAnalytics = async () => {
      const res = await fetch('/api/analytics');
      if (!res.ok) {
        throw new Error('Unable to load analytics');
      }
      const data = await res.json();
      renderBars(data.daily);
      renderLine(data.hourly);
    };

    const pollLive = async () => {
      try {
        const res = await fetch('/api/live');
        if (res.ok) {
          const data = await res.json();
          inEl.textContent = data.peopleIn;
          outEl.textContent = data.peopleOut;
          insideEl.textContent = data.peopleInside;
          statusEl.dataset.status = data.status;
          statusEl.textContent = `Conexão: ${data.status}`;
        }
      } finally {
        setTimeout(pollLive, 1000);
      }
    };

    loadAnalytics().catch((err) => {
      statusEl.textContent = err.message;
    });
    pollLive();
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::LiveCounter;
    use crate::models::LiveCounterState;
    use crate::stats::build_analytics;

    #[test]
    fn page_carries_counters_and_peaks() {
        let live = LiveCounter::new(true);
        live.apply(
            LiveCounterState {
                people_in: 12,
                people_out: 5,
                people_inside: 7,
            },
            None,
        );
        let snapshot = live.current();
        let analytics = build_analytics().unwrap();
        let html = render_index(&snapshot, ConnectionStatus::Connected, &analytics);

        assert!(html.contains(r#"<span id="people-in" class="value">12</span>"#));
        assert!(html.contains(r#"<span id="people-inside" class="value">7</span>"#));
        assert!(html.contains(r#"<span class="day">Sáb</span>"#));
        assert!(html.contains(r#"<span class="hour">18:00</span>"#));
        assert!(html.contains(r#"data-status="connected""#));
        assert!(!html.contains("{{"));
    }
}
