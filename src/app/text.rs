//! Plain-text reports printed by the one-shot commands.

use std::fmt::Write;

use crate::api::dashboard::{
    ChartsData, DashboardOverview, Distribution, Health, RecentActivities,
};

const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S UTC";

fn optional(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format!("{v:.1}{unit}"))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn overview(overview: &DashboardOverview) -> String {
    let stats = &overview.stats;
    let delivery = &overview.delivery_metrics;
    let routes = &overview.route_metrics;
    let boxes = &overview.box_metrics;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Overview (generated {})",
        overview.generated_at.format(TIMESTAMP)
    );
    let _ = writeln!(
        out,
        "  Outlets   {}/{} active ({:.1}%)",
        stats.active_outlets,
        stats.total_outlets,
        stats.active_outlet_share()
    );
    let _ = writeln!(
        out,
        "  Orders    {} total, {} pending, {} in transit, {} delivered ({:.1}%)",
        stats.total_orders,
        stats.pending_orders,
        stats.orders_in_transit,
        stats.delivered_orders,
        stats.delivered_share()
    );
    let _ = writeln!(
        out,
        "  Routes    {} total, {} active, {} completed",
        stats.total_routes, stats.active_routes, stats.completed_routes
    );
    let _ = writeln!(
        out,
        "  Delivery  {:.1}% success, {:.1}% on time, avg {}, today {} delivered / {} pending",
        delivery.delivery_success_rate,
        delivery.on_time_delivery_rate,
        optional(delivery.avg_delivery_time_minutes, " min"),
        delivery.orders_delivered_today,
        delivery.orders_pending_today
    );
    let _ = writeln!(
        out,
        "  Fleet     {:.1} stops/route, {:.1}% completion, {}, {}, today {} in progress / {} done",
        routes.avg_stops_per_route,
        routes.avg_route_completion,
        optional(routes.avg_distance_km, " km"),
        optional(routes.avg_fuel_efficiency, " km/l"),
        routes.routes_in_progress,
        routes.routes_completed_today
    );
    let _ = writeln!(
        out,
        "  Boxes     {} total, {} in transit, {} fragile, {} refrigerated, {:.1} kg ({:.1} kg avg, {:.1}% fill)",
        stats.total_boxes,
        boxes.boxes_in_transit,
        boxes.fragile_boxes,
        boxes.refrigerated_boxes,
        boxes.total_weight_kg,
        boxes.avg_box_weight_kg,
        boxes.avg_fill_percentage
    );
    out
}

fn distribution(out: &mut String, title: &str, series: &[Distribution]) {
    let _ = writeln!(out, "{title}");
    if series.is_empty() {
        let _ = writeln!(out, "  (empty)");
    }
    for item in series {
        let _ = writeln!(
            out,
            "  {:<14} {:>6}  {:>5.1}%",
            item.label, item.count, item.percentage
        );
    }
}

pub fn charts(charts: &ChartsData) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Charts (generated {})",
        charts.generated_at.format(TIMESTAMP)
    );
    distribution(&mut out, "Orders by status", &charts.order_status_distribution);
    distribution(&mut out, "Routes by status", &charts.route_status_distribution);
    distribution(
        &mut out,
        "Outlets by priority",
        &charts.outlet_priority_distribution,
    );

    let _ = writeln!(out, "Vehicles by type");
    for (vehicle, share) in charts
        .vehicle_type_distribution
        .iter()
        .zip(charts.vehicle_type_shares())
    {
        let _ = writeln!(
            out,
            "  {:<14} {:>6}  {:>5.1}%  {:.0} kg capacity",
            vehicle.vehicle_type, vehicle.count, share.1, vehicle.total_capacity_kg
        );
    }

    let _ = writeln!(out, "Delivery trend");
    for day in &charts.delivery_trends {
        let _ = writeln!(
            out,
            "  {}  {} delivered, {} pending, {} cancelled ({} total)",
            day.date,
            day.delivered,
            day.pending,
            day.cancelled,
            day.total()
        );
    }

    let _ = writeln!(out, "Top routes");
    for route in &charts.top_routes {
        let _ = writeln!(
            out,
            "  {:<10} {}/{} stops ({:.0}%), {}",
            route.route_code,
            route.completed_stops,
            route.planned_stops,
            route.completion_ratio() * 100.0,
            optional(route.distance_km, " km")
        );
    }
    out
}

pub fn activities(page: &RecentActivities) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Recent activity ({} of {})",
        page.activities.len(),
        page.total
    );
    for activity in &page.activities {
        let _ = writeln!(
            out,
            "  {}  [{}/{}] {}",
            activity.timestamp.format(TIMESTAMP),
            activity.kind,
            activity.action,
            activity.description
        );
    }
    out
}

pub fn health(health: &Health) -> String {
    format!(
        "{} {} is {}\n",
        health.service, health.version, health.status
    )
}
