//! Per-player, per-category production queues (§4.6).
//!
//! Each player has one queue per [`Category`]. A queue holds at most one
//! `current` item advancing toward completion; additional requests wait in
//! `queued`. Progress is driven by credits spent into `invested`, not by a
//! flat per-tick percentage — canceling always refunds exactly `invested`,
//! never a recomputed fraction of nominal cost (§8).

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::math::Vec2Fixed;
use crate::rules::{Category, RuleCatalog, RuleKey};

/// Ticks of full-price production one unit of cost buys at speed 1x, i.e. a
/// cost-`N` item with no speed bonus finishes in `N / (N / BUILD_TICK_BASE)`
/// ticks; per-tick cost is `cost / BUILD_TICK_BASE` (§4.6).
pub const BUILD_TICK_BASE: u32 = 600;

/// Multiplier (percent) applied to production speed when power is starved
/// (`max_power < used_power`), per §4.6.
pub const POWER_STARVATION_PERCENT: u32 = 25;

/// An item in a production queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionItem {
    /// Catalog key of the unit/building being produced.
    pub key: RuleKey,
    /// Nominal credits cost, looked up once at enqueue time.
    pub cost: u32,
    /// Progress, 0..100.
    pub progress: u32,
    /// Credits invested so far; refunded verbatim on cancel, never
    /// recomputed as a fraction of `cost` (§3/§8).
    pub invested: u32,
}

impl ProductionItem {
    /// Create a freshly queued item with no progress or investment.
    #[must_use]
    pub const fn new(key: RuleKey, cost: u32) -> Self {
        Self {
            key,
            cost,
            progress: 0,
            invested: 0,
        }
    }

    /// Whether this item has finished (progress reached 100).
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.progress >= 100
    }

    /// Advance by one tick: spend up to `per_tick_cost` from `credits` into
    /// `invested`, then recompute `progress` proportionally to `invested`.
    fn tick(&mut self, per_tick_cost: u32, credits: &mut u32) {
        let spend = per_tick_cost.min(*credits);
        *credits -= spend;
        self.invested += spend;
        self.progress = if self.cost == 0 {
            100
        } else {
            ((self.invested as u64 * 100) / self.cost as u64).min(100) as u32
        };
    }
}

/// Errors returned by production operations. Reserved for data/config
/// failures; gameplay refusals (insufficient credits, unmet prerequisite,
/// full queue) are notifications, not errors, per §7/§10.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionRefusal {
    /// The category's queued list is already at capacity.
    QueueFull,
    /// Player cannot afford the item's cost.
    InsufficientCredits,
    /// The key's prerequisites are not met.
    PrerequisiteMissing,
    /// The key does not exist in the rule catalog.
    UnknownKey,
    /// The key's `max_count` has already been reached.
    MaxCountReached,
}

/// Maximum number of items waiting behind the current one, per category.
pub const MAX_QUEUED: usize = 5;

/// One category's production queue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryQueue {
    /// Item currently under construction, if any.
    pub current: Option<ProductionItem>,
    /// Items waiting their turn.
    pub queued: VecDeque<ProductionItem>,
}

impl CategoryQueue {
    /// Whether the queue (current + queued) is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.queued.is_empty()
    }

    /// Advance `current` by one tick at the given speed multiplier (percent;
    /// 100 = normal, 25 = power-starved, scaled further by per-difficulty
    /// `buildSpeedBonus` for AI players). Deducts `(cost / BUILD_TICK_BASE) *
    /// speed_percent / 100` from `credits` into the item's `invested`, never
    /// more than `credits` has available. Returns a completed item once
    /// `invested` reaches `cost`.
    pub fn tick(&mut self, speed_percent: u32, credits: &mut u32) -> Option<ProductionItem> {
        if self.current.is_none() {
            self.current = self.queued.pop_front();
        }

        let item = self.current.as_mut()?;
        let per_tick_cost = if item.cost == 0 {
            0
        } else {
            (((item.cost / BUILD_TICK_BASE) * speed_percent) / 100).max(1)
        };
        item.tick(per_tick_cost, credits);

        if item.is_complete() {
            self.current.take()
        } else {
            None
        }
    }

    /// Queue a new item; no credits are spent until it actually starts
    /// advancing under [`CategoryQueue::tick`].
    pub fn enqueue(&mut self, key: RuleKey, cost: u32) -> Result<(), ProductionRefusal> {
        if self.queued.len() >= MAX_QUEUED {
            return Err(ProductionRefusal::QueueFull);
        }
        let item = ProductionItem::new(key, cost);
        if self.current.is_none() {
            self.current = Some(item);
        } else {
            self.queued.push_back(item);
        }
        Ok(())
    }

    /// Cancel the current item, refunding exactly its `invested` credits.
    pub fn cancel_current(&mut self) -> Option<u32> {
        self.current.take().map(|item| item.invested)
    }
}

/// Per-player production state: one queue per category, plus any building
/// finished and awaiting placement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerProduction {
    /// Building category queue.
    pub building: CategoryQueue,
    /// Infantry category queue.
    pub infantry: CategoryQueue,
    /// Vehicle category queue.
    pub vehicle: CategoryQueue,
    /// Air category queue.
    pub air: CategoryQueue,
    /// A finished building awaiting player placement, if any.
    pub ready_to_place: Option<RuleKey>,
}

impl PlayerProduction {
    /// Get the queue for a category.
    #[must_use]
    pub fn queue(&self, category: Category) -> &CategoryQueue {
        match category {
            Category::Building => &self.building,
            Category::Infantry => &self.infantry,
            Category::Vehicle => &self.vehicle,
            Category::Air => &self.air,
        }
    }

    /// Get the queue for a category, mutably.
    pub fn queue_mut(&mut self, category: Category) -> &mut CategoryQueue {
        match category {
            Category::Building => &mut self.building,
            Category::Infantry => &mut self.infantry,
            Category::Vehicle => &mut self.vehicle,
            Category::Air => &mut self.air,
        }
    }

    /// Advance all four category queues by one tick, spending from `credits`
    /// as each queue's current item consumes its per-tick cost.
    ///
    /// Returns completed items: `(category, key)` for units to spawn
    /// immediately, and buildings are instead set into `ready_to_place`.
    pub fn tick(&mut self, speed_percent: u32, credits: &mut u32) -> Vec<(Category, RuleKey)> {
        let mut completed = Vec::new();
        for category in [
            Category::Building,
            Category::Infantry,
            Category::Vehicle,
            Category::Air,
        ] {
            if let Some(item) = self.queue_mut(category).tick(speed_percent, credits) {
                if category == Category::Building {
                    self.ready_to_place = Some(item.key);
                } else {
                    completed.push((category, item.key));
                }
            }
        }
        completed
    }
}

/// Validate and enqueue a production request. No credits are deducted here;
/// the category queue spends gradually from `credits` as it ticks (§4.6).
pub fn queue_production(
    production: &mut PlayerProduction,
    owned_buildings: &[RuleKey],
    key: RuleKey,
    catalog: &RuleCatalog,
    credits: u32,
    current_count: u32,
) -> Result<(), ProductionRefusal> {
    let entry = catalog.get(key).ok_or(ProductionRefusal::UnknownKey)?;

    if !entry
        .prerequisites
        .iter()
        .all(|req| owned_buildings.contains(req))
    {
        return Err(ProductionRefusal::PrerequisiteMissing);
    }

    if let Some(max) = entry.max_count {
        if current_count >= max {
            return Err(ProductionRefusal::MaxCountReached);
        }
    }

    if credits < entry.cost {
        return Err(ProductionRefusal::InsufficientCredits);
    }

    production.queue_mut(entry.category).enqueue(key, entry.cost)
}

/// Cancel the current item in `category`, refunding `invested` credits
/// verbatim (never a recomputed percentage of nominal cost, per §8).
pub fn cancel_production(
    production: &mut PlayerProduction,
    category: Category,
    credits: &mut u32,
) -> Option<u32> {
    let refund = production.queue_mut(category).cancel_current()?;
    *credits += refund;
    Some(refund)
}

/// Default spawn offset from a production building's position, in world units.
pub const DEFAULT_SPAWN_OFFSET: i32 = 2;

/// Compute a spawn position for a newly completed unit, using the building's
/// rally point if set, else an offset from its position.
#[must_use]
pub fn spawn_position(building_position: Vec2Fixed, rally_point: Option<Vec2Fixed>) -> Vec2Fixed {
    rally_point.unwrap_or_else(|| {
        use crate::math::Fixed;
        Vec2Fixed::new(
            building_position.x + Fixed::from_num(DEFAULT_SPAWN_OFFSET),
            building_position.y + Fixed::from_num(DEFAULT_SPAWN_OFFSET),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_refunds_invested_not_nominal_cost() {
        let catalog = RuleCatalog::standard();
        let mut production = PlayerProduction::default();
        let mut credits = 10_000u32;

        queue_production(
            &mut production,
            &[RuleKey("conyard")],
            RuleKey("tank"),
            &catalog,
            credits,
            0,
        )
        .unwrap();

        // Advance partway: credits get spent gradually into `invested`.
        for _ in 0..10 {
            production.building.tick(100, &mut credits); // no-op, different category
            production.vehicle.tick(100, &mut credits);
        }

        let invested_before_cancel = production.vehicle.current.as_ref().unwrap().invested;
        assert!(invested_before_cancel > 0);
        let credits_before_cancel = credits;

        let refunded = cancel_production(&mut production, Category::Vehicle, &mut credits);
        assert_eq!(refunded, Some(invested_before_cancel));
        assert_eq!(credits, credits_before_cancel + invested_before_cancel);
    }

    #[test]
    fn prerequisite_enforced() {
        let catalog = RuleCatalog::standard();
        let mut production = PlayerProduction::default();
        let credits = 10_000u32;

        let result = queue_production(
            &mut production,
            &[],
            RuleKey("refinery"),
            &catalog,
            credits,
            0,
        );
        assert_eq!(result, Err(ProductionRefusal::PrerequisiteMissing));
    }

    #[test]
    fn queue_completes_at_100_progress() {
        let mut queue = CategoryQueue::default();
        queue.enqueue(RuleKey("rifleman"), 100).unwrap();
        let mut credits = 1_000u32;

        let mut completed = None;
        for _ in 0..500 {
            if let Some(item) = queue.tick(100, &mut credits) {
                completed = Some(item);
                break;
            }
        }
        assert_eq!(completed.map(|i| i.key), Some(RuleKey("rifleman")));
    }

    #[test]
    fn power_starvation_slows_progress() {
        let mut fast = CategoryQueue::default();
        fast.enqueue(RuleKey("tank"), 2400).unwrap();
        let mut slow = fast.clone();
        let mut fast_credits = 10_000u32;
        let mut slow_credits = 10_000u32;

        for _ in 0..10 {
            fast.tick(100, &mut fast_credits);
            slow.tick(POWER_STARVATION_PERCENT, &mut slow_credits);
        }

        assert!(fast.current.as_ref().unwrap().progress > slow.current.as_ref().unwrap().progress);
    }
}
