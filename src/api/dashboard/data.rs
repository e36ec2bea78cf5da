use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::parse::lenient_timestamp;
use crate::ArcStr;

/// Counts across outlets, orders, routes and boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewStats {
    pub total_outlets: u64,
    pub active_outlets: u64,
    pub total_orders: u64,
    pub pending_orders: u64,
    pub orders_in_transit: u64,
    pub delivered_orders: u64,
    pub total_routes: u64,
    pub active_routes: u64,
    pub completed_routes: u64,
    pub total_boxes: u64,
}

impl OverviewStats {
    /// Share of outlets currently active, in percent.
    pub fn active_outlet_share(&self) -> f64 {
        percentage(self.active_outlets, self.total_outlets)
    }

    /// Share of orders already delivered, in percent.
    pub fn delivered_share(&self) -> f64 {
        percentage(self.delivered_orders, self.total_orders)
    }
}

/// Delivery performance. Rates are percentages in `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryMetrics {
    pub delivery_success_rate: f64,
    #[serde(default)]
    pub avg_delivery_time_minutes: Option<f64>,
    pub on_time_delivery_rate: f64,
    pub orders_delivered_today: u64,
    pub orders_pending_today: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub avg_stops_per_route: f64,
    /// Average completion of routes, in percent
    pub avg_route_completion: f64,
    #[serde(default)]
    pub avg_distance_km: Option<f64>,
    /// Kilometres per litre
    #[serde(default)]
    pub avg_fuel_efficiency: Option<f64>,
    pub routes_in_progress: u64,
    pub routes_completed_today: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxMetrics {
    pub total_weight_kg: f64,
    pub avg_box_weight_kg: f64,
    pub avg_fill_percentage: f64,
    pub boxes_in_transit: u64,
    pub fragile_boxes: u64,
    pub refrigerated_boxes: u64,
}

/// Payload of `GET /api/v1/dashboard/overview`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub stats: OverviewStats,
    pub delivery_metrics: DeliveryMetrics,
    pub route_metrics: RouteMetrics,
    pub box_metrics: BoxMetrics,
    /// Server-side generation time, not guaranteed to be monotonic
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub generated_at: DateTime<Utc>,
}

/// One slice of a categorical distribution, e.g. orders by status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    /// Category name; the backend calls it `status` or `priority`
    #[serde(alias = "status", alias = "priority")]
    pub label: ArcStr,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTypeDistribution {
    pub vehicle_type: ArcStr,
    pub count: u64,
    pub total_capacity_kg: f64,
}

/// Daily delivery counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTrend {
    /// Day as sent by the backend (`YYYY-MM-DD`)
    pub date: ArcStr,
    pub delivered: u64,
    pub pending: u64,
    pub cancelled: u64,
}

impl DeliveryTrend {
    pub fn total(&self) -> u64 {
        self.delivered + self.pending + self.cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEfficiency {
    pub route_code: ArcStr,
    pub planned_stops: u64,
    pub completed_stops: u64,
    /// Backend-computed completion, in percent
    pub completion_rate: f64,
    #[serde(default)]
    pub distance_km: Option<f64>,
}

impl RouteEfficiency {
    /// Completed over planned stops in `0.0..=1.0`; a route without planned
    /// stops counts as complete.
    pub fn completion_ratio(&self) -> f64 {
        if self.planned_stops == 0 {
            return 1.0;
        }
        (self.completed_stops as f64 / self.planned_stops as f64).clamp(0.0, 1.0)
    }
}

/// Payload of `GET /api/v1/dashboard/charts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartsData {
    pub order_status_distribution: Vec<Distribution>,
    pub route_status_distribution: Vec<Distribution>,
    pub outlet_priority_distribution: Vec<Distribution>,
    pub vehicle_type_distribution: Vec<VehicleTypeDistribution>,
    pub delivery_trends: Vec<DeliveryTrend>,
    pub top_routes: Vec<RouteEfficiency>,
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub generated_at: DateTime<Utc>,
}

impl ChartsData {
    /// Percentage share of each vehicle type by route count. The backend
    /// does not send one for this series.
    pub fn vehicle_type_shares(&self) -> Vec<(ArcStr, f64)> {
        let total = self.vehicle_type_distribution.iter().map(|v| v.count).sum();
        self.vehicle_type_distribution
            .iter()
            .map(|v| (v.vehicle_type.clone(), percentage(v.count, total)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub id: u64,
    /// `order`, `route` or `outlet`
    #[serde(rename = "type")]
    pub kind: ArcStr,
    /// `created`, `updated`, `started` or `completed`
    pub action: ArcStr,
    pub description: ArcStr,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Payload of `GET /api/v1/dashboard/recent-activities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentActivities {
    pub activities: Vec<RecentActivity>,
    pub total: u64,
}

/// Payload of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: ArcStr,
    #[serde(default)]
    pub service: ArcStr,
    #[serde(default)]
    pub version: ArcStr,
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}

/// `part` as a percentage of `whole`, `0.0` when `whole` is zero.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(planned: u64, completed: u64) -> RouteEfficiency {
        RouteEfficiency {
            route_code: ArcStr::from("RT-001"),
            planned_stops: planned,
            completed_stops: completed,
            completion_rate: 0.0,
            distance_km: None,
        }
    }

    #[test]
    fn test_completion_ratio() {
        assert_eq!(route(15, 15).completion_ratio(), 1.0);
        assert_eq!(route(4, 1).completion_ratio(), 0.25);
        assert_eq!(route(0, 0).completion_ratio(), 1.0);
        assert_eq!(route(2, 5).completion_ratio(), 1.0);
    }

    #[test]
    fn test_percentage_handles_zero_total() {
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }

    #[test]
    fn test_vehicle_type_shares() {
        let charts = ChartsData {
            order_status_distribution: vec![],
            route_status_distribution: vec![],
            outlet_priority_distribution: vec![],
            vehicle_type_distribution: vec![
                VehicleTypeDistribution {
                    vehicle_type: ArcStr::from("truck"),
                    count: 3,
                    total_capacity_kg: 300.0,
                },
                VehicleTypeDistribution {
                    vehicle_type: ArcStr::from("van"),
                    count: 1,
                    total_capacity_kg: 50.0,
                },
            ],
            delivery_trends: vec![],
            top_routes: vec![],
            generated_at: Utc::now(),
        };
        let shares = charts.vehicle_type_shares();
        assert_eq!(shares[0], (ArcStr::from("truck"), 75.0));
        assert_eq!(shares[1], (ArcStr::from("van"), 25.0));
    }

    #[test]
    fn test_health_status() {
        let health = Health {
            status: ArcStr::from("healthy"),
            service: ArcStr::default(),
            version: ArcStr::default(),
        };
        assert!(health.is_healthy());
    }
}
