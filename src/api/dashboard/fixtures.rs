//! Sample payloads shared by tests across the crate.

use chrono::{TimeZone, Utc};

use super::data::*;
use crate::ArcStr;

pub fn overview() -> DashboardOverview {
    DashboardOverview {
        stats: OverviewStats {
            total_outlets: 156,
            active_outlets: 142,
            total_orders: 2847,
            pending_orders: 89,
            orders_in_transit: 45,
            delivered_orders: 2680,
            total_routes: 312,
            active_routes: 8,
            completed_routes: 298,
            total_boxes: 4521,
        },
        delivery_metrics: DeliveryMetrics {
            delivery_success_rate: 94.2,
            avg_delivery_time_minutes: Some(18.5),
            on_time_delivery_rate: 91.8,
            orders_delivered_today: 67,
            orders_pending_today: 23,
        },
        route_metrics: RouteMetrics {
            avg_stops_per_route: 12.4,
            avg_route_completion: 96.8,
            avg_distance_km: Some(45.2),
            avg_fuel_efficiency: Some(8.5),
            routes_in_progress: 3,
            routes_completed_today: 6,
        },
        box_metrics: BoxMetrics {
            total_weight_kg: 2847.5,
            avg_box_weight_kg: 12.4,
            avg_fill_percentage: 82.3,
            boxes_in_transit: 127,
            fragile_boxes: 45,
            refrigerated_boxes: 23,
        },
        generated_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
    }
}

fn distribution(label: &str, count: u64, percentage: f64) -> Distribution {
    Distribution {
        label: ArcStr::from(label),
        count,
        percentage,
    }
}

pub fn charts() -> ChartsData {
    ChartsData {
        order_status_distribution: vec![
            distribution("delivered", 2680, 94.1),
            distribution("pending", 89, 3.1),
        ],
        route_status_distribution: vec![distribution("completed", 298, 95.5)],
        outlet_priority_distribution: vec![
            distribution("high", 34, 21.8),
            distribution("low", 44, 28.2),
        ],
        vehicle_type_distribution: vec![VehicleTypeDistribution {
            vehicle_type: ArcStr::from("truck"),
            count: 156,
            total_capacity_kg: 15600.0,
        }],
        delivery_trends: vec![DeliveryTrend {
            date: ArcStr::from("2024-03-01"),
            delivered: 85,
            pending: 4,
            cancelled: 0,
        }],
        top_routes: vec![RouteEfficiency {
            route_code: ArcStr::from("RT-001"),
            planned_stops: 15,
            completed_stops: 12,
            completion_rate: 80.0,
            distance_km: Some(45.2),
        }],
        generated_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
    }
}

pub fn activities(count: u64) -> RecentActivities {
    let activities = (1..=count)
        .map(|id| RecentActivity {
            id,
            kind: ArcStr::from("order"),
            action: ArcStr::from("completed"),
            description: ArcStr::from(format!("Order #{id} delivered")),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        })
        .collect();
    RecentActivities {
        activities,
        total: count,
    }
}

pub fn health() -> Health {
    Health {
        status: ArcStr::from("healthy"),
        service: ArcStr::from("Logistics API"),
        version: ArcStr::from("1.0.0"),
    }
}

/// Serializes a payload the way the backend would send it.
pub fn json<T: serde::Serialize>(payload: &T) -> String {
    serde_json::to_string(payload).unwrap()
}
