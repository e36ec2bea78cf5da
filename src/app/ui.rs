//! Rendering of the full-screen dashboard.
//!
//! [`draw`] is a pure function of a [`DashboardView`]; every frame is built
//! from scratch so the renderer never holds state of its own.

use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Gauge, List, ListItem, Paragraph, Wrap},
};

use super::data::{DashboardView, ResourceKind, ResourceView};
use crate::{
    api::dashboard::{ChartsData, DashboardOverview, Distribution, RecentActivities},
    sync::EntryStatus,
};

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
const BAR_WIDTH: usize = 20;

pub fn spinner(frame: usize) -> &'static str {
    SPINNER[frame % SPINNER.len()]
}

/// A horizontal bar of `width` cells filled to `share` percent.
fn bar(share: f64, width: usize) -> String {
    let filled = ((share.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn age(now: Option<DateTime<Utc>>, then: Option<DateTime<Utc>>) -> Option<String> {
    let seconds = (now? - then?).num_seconds().max(0);
    Some(match seconds {
        0..60 => format!("{seconds}s ago"),
        60..3600 => format!("{}m ago", seconds / 60),
        _ => format!("{}h ago", seconds / 3600),
    })
}

/// Border block of a panel. The title carries the refresh key, a spinner
/// while a fetch is in flight and the freshness of the data.
fn panel<T>(kind: ResourceKind, key: char, view: &DashboardView, resource: &ResourceView<T>) -> Block<'static> {
    let mut title = vec![Span::raw(format!(" [{key}] {kind} ")).bold()];
    if resource.is_validating {
        title.push(Span::raw(format!("{} ", spinner(view.spinner_frame))).fg(Color::Cyan));
    }
    let border = match resource.status() {
        EntryStatus::Stale => {
            title.push(Span::raw("stale ").fg(Color::Yellow));
            Color::Yellow
        }
        EntryStatus::Failed => Color::Red,
        _ => Color::Reset,
    };
    let mut block = Block::bordered()
        .title(Line::from(title))
        .border_style(Style::new().fg(border));
    if let Some(age) = age(view.now, resource.fetched_at) {
        block = block.title(Line::from(format!(" {age} ")).right_aligned().dim());
    }
    if let (Some(_), Some(error)) = (&resource.data, &resource.error) {
        block = block.title_bottom(Line::from(format!(" {error} ")).fg(Color::Yellow));
    }
    block
}

/// Body shown instead of the data while there is none.
fn placeholder<T>(resource: &ResourceView<T>) -> Option<Paragraph<'static>> {
    let text = match resource.status() {
        EntryStatus::Ready | EntryStatus::Stale => return None,
        EntryStatus::Idle => Line::from("Waiting for first fetch").dim(),
        EntryStatus::Loading => Line::from("Loading...").fg(Color::Cyan),
        EntryStatus::Failed => {
            let error = resource
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            Line::from(format!("Failed to load: {error}")).fg(Color::Red)
        }
    };
    Some(Paragraph::new(text).wrap(Wrap { trim: true }))
}

pub fn draw(frame: &mut Frame, view: &DashboardView) {
    let [header, overview, charts, activities, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(7),
        Constraint::Min(10),
        Constraint::Length(10),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(frame, header, view);
    draw_overview(frame, overview, view);
    draw_charts(frame, charts, view);
    draw_activities(frame, activities, view);
    frame.render_widget(
        Paragraph::new("r refresh all  1/2/3 refresh panel  q quit").dim(),
        footer,
    );
}

fn draw_header(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let mut spans = vec![
        Span::raw("logidash ").bold(),
        Span::raw(view.api_url.to_string()).dim(),
    ];
    if view.is_refreshing {
        spans.push(Span::raw(format!("  {} Refreshing", spinner(view.spinner_frame))).fg(Color::Cyan));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_overview(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let resource = &view.overview;
    let block = panel(ResourceKind::Overview, '1', view, resource);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(placeholder) = placeholder(resource) {
        frame.render_widget(placeholder, inner);
        return;
    }
    let Some(overview) = &resource.data else {
        return;
    };
    let cards = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(inner);
    for (area, card) in cards.iter().zip(overview_cards(overview)) {
        frame.render_widget(card, *area);
    }
}

fn overview_cards(overview: &DashboardOverview) -> [Paragraph<'static>; 4] {
    let stats = &overview.stats;
    let delivery = &overview.delivery_metrics;
    let routes = &overview.route_metrics;
    let boxes = &overview.box_metrics;
    let card = |title: &str, lines: Vec<Line<'static>>| {
        Paragraph::new(lines).block(Block::new().title(title.to_string().bold()))
    };
    [
        card(
            "Outlets",
            vec![
                Line::from(format!("{} / {}", stats.active_outlets, stats.total_outlets)),
                Line::from(format!("{:.1}% active", stats.active_outlet_share())).dim(),
            ],
        ),
        card(
            "Orders",
            vec![
                Line::from(format!("{} total", stats.total_orders)),
                Line::from(format!(
                    "{} pending, {} in transit",
                    stats.pending_orders, stats.orders_in_transit
                )),
                Line::from(format!("{:.1}% delivered", stats.delivered_share())).dim(),
            ],
        ),
        card(
            "Routes",
            vec![
                Line::from(format!("{} active", stats.active_routes)),
                Line::from(format!(
                    "{:.1} stops avg, {:.1}% done",
                    routes.avg_stops_per_route, routes.avg_route_completion
                )),
                Line::from(format!("{} boxes in transit", boxes.boxes_in_transit)).dim(),
            ],
        ),
        card(
            "Delivery",
            vec![
                Line::from(format!("{:.1}% success", delivery.delivery_success_rate)),
                Line::from(format!("{:.1}% on time", delivery.on_time_delivery_rate)),
                Line::from(format!(
                    "{} today, {} pending",
                    delivery.orders_delivered_today, delivery.orders_pending_today
                ))
                .dim(),
            ],
        ),
    ]
}

fn distribution_lines(title: &str, series: &[Distribution]) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(title.to_string()).add_modifier(Modifier::UNDERLINED)];
    lines.extend(series.iter().map(|item| {
        Line::from(vec![
            Span::raw(format!("{:<12}", item.label)),
            Span::raw(bar(item.percentage, BAR_WIDTH)).fg(Color::Blue),
            Span::raw(format!(" {:>5} {:>5.1}%", item.count, item.percentage)),
        ])
    }));
    lines.push(Line::default());
    lines
}

fn draw_charts(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let resource = &view.charts;
    let block = panel(ResourceKind::Charts, '2', view, resource);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(placeholder) = placeholder(resource) {
        frame.render_widget(placeholder, inner);
        return;
    }
    let Some(charts) = &resource.data else {
        return;
    };
    let [left, right] = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(inner);
    frame.render_widget(Paragraph::new(series_lines(charts)), left);
    draw_routes(frame, right, charts);
}

fn series_lines(charts: &ChartsData) -> Vec<Line<'static>> {
    let mut lines = distribution_lines("Orders by status", &charts.order_status_distribution);
    lines.extend(distribution_lines(
        "Routes by status",
        &charts.route_status_distribution,
    ));
    lines.extend(distribution_lines(
        "Outlets by priority",
        &charts.outlet_priority_distribution,
    ));
    lines.push(Line::from("Vehicles by type").add_modifier(Modifier::UNDERLINED));
    lines.extend(charts.vehicle_type_shares().into_iter().zip(&charts.vehicle_type_distribution).map(
        |((label, share), vehicle)| {
            Line::from(vec![
                Span::raw(format!("{label:<12}")),
                Span::raw(bar(share, BAR_WIDTH)).fg(Color::Magenta),
                Span::raw(format!(" {:>5} {:>5.1}%", vehicle.count, share)),
            ])
        },
    ));
    lines.push(Line::default());
    lines.push(Line::from("Delivery trend").add_modifier(Modifier::UNDERLINED));
    lines.extend(charts.delivery_trends.iter().map(|day| {
        Line::from(format!(
            "{}  {:>4} delivered {:>4} pending {:>4} cancelled",
            day.date, day.delivered, day.pending, day.cancelled
        ))
    }));
    lines
}

fn draw_routes(frame: &mut Frame, area: Rect, charts: &ChartsData) {
    let title = Block::new().title("Top routes".underlined());
    let inner = title.inner(area);
    frame.render_widget(title, area);

    let rows = Layout::vertical(vec![Constraint::Length(1); charts.top_routes.len()]).split(inner);
    for (area, route) in rows.iter().zip(&charts.top_routes) {
        let gauge = Gauge::default()
            .ratio(route.completion_ratio())
            .label(format!(
                "{} {}/{}",
                route.route_code, route.completed_stops, route.planned_stops
            ))
            .gauge_style(Style::new().fg(Color::Green));
        frame.render_widget(gauge, *area);
    }
}

fn activity_items(page: &RecentActivities) -> Vec<ListItem<'static>> {
    page.activities
        .iter()
        .map(|activity| {
            ListItem::new(Line::from(vec![
                Span::raw(activity.timestamp.format("%H:%M:%S ").to_string()).dim(),
                Span::raw(format!("{:<7}", activity.kind)).fg(Color::Cyan),
                Span::raw(format!("{:<10}", activity.action)),
                Span::raw(activity.description.to_string()),
            ]))
        })
        .collect()
}

fn draw_activities(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let resource = &view.activities;
    let block = panel(ResourceKind::Activities, '3', view, resource);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(placeholder) = placeholder(resource) {
        frame.render_widget(placeholder, inner);
        return;
    }
    if let Some(page) = &resource.data {
        frame.render_widget(List::new(activity_items(page)), inner);
    }
}
