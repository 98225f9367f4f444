use super::{Grouping, StatsFilter, Sum, Tally, buckets};
use crate::model::Order;
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderSeriesPoint {
    /// Month number (1-12) or day of month
    pub bucket: u32,
    pub label: String,
    pub count: usize,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderStats {
    pub total_orders: usize,
    pub total_amount: f64,
    pub total_down_payment: f64,
    pub total_outstanding: f64,
    pub average_amount: f64,
    pub by_work_status: BTreeMap<String, Tally>,
    pub by_vendor: BTreeMap<String, Tally>,
    pub by_theme: BTreeMap<String, Tally>,
    pub by_package: BTreeMap<String, Tally>,
    pub by_addon: BTreeMap<String, Tally>,
    pub series: Vec<OrderSeriesPoint>,
}

/// Orders whose event year is unknown pass any year filter: they live in
/// the active year's shards.
fn selected(order: &Order, filter: &StatsFilter) -> bool {
    if let Some(month) = filter.month {
        if order.effective_month() != Some(month) {
            return false;
        }
    }
    if let (Some(year), Some(day)) = (filter.year, order.event_day()) {
        if day.year() != year {
            return false;
        }
    }
    true
}

pub fn order_stats(orders: &[Order], filter: &StatsFilter) -> OrderStats {
    let layout = buckets(filter);
    let mut series: Vec<(usize, Sum)> = vec![(0, Sum::default()); layout.len()];

    let mut total = Sum::default();
    let mut down_payment = Sum::default();
    let mut outstanding = Sum::default();
    let mut count = 0usize;
    let mut by_status = Grouping::default();
    let mut by_vendor = Grouping::default();
    let mut by_theme = Grouping::default();
    let mut by_package = Grouping::default();
    let mut by_addon = Grouping::default();

    for order in orders.iter().filter(|o| selected(o, filter)) {
        let amount = order.amount.value();
        count += 1;
        total.add(amount);
        down_payment.add(order.down_payment.value());
        outstanding.add(order.outstanding());

        by_status.add(order.work_status_id.as_deref(), amount);
        by_vendor.add(order.vendor_id.as_deref(), amount);
        by_theme.add(order.theme_id.as_deref(), amount);
        by_package.add(order.package_id.as_deref(), amount);
        for addon in &order.addon_ids {
            by_addon.add(Some(addon.as_str()), amount);
        }

        let bucket = match filter.month {
            None => order.effective_month().map(|m| m.number()),
            Some(_) => order.event_day().map(|d| d.day()),
        };
        if let Some(slot) = bucket.and_then(|b| layout.iter().position(|(n, _)| *n == b)) {
            series[slot].0 += 1;
            series[slot].1.add(amount);
        }
    }

    let total_amount = total.value();
    OrderStats {
        total_orders: count,
        total_amount,
        total_down_payment: down_payment.value(),
        total_outstanding: outstanding.value(),
        average_amount: if count == 0 { 0.0 } else { total_amount / count as f64 },
        by_work_status: by_status.finish(),
        by_vendor: by_vendor.finish(),
        by_theme: by_theme.finish(),
        by_package: by_package.finish(),
        by_addon: by_addon.finish(),
        series: layout
            .into_iter()
            .zip(series)
            .map(|((bucket, label), (count, sum))| OrderSeriesPoint {
                bucket,
                label,
                count,
                amount: sum.value(),
            })
            .collect(),
    }
}
