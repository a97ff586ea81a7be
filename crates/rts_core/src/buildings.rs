//! Building placement, construction, and structure behaviors (§4.7).
//!
//! Handles placement validation against a build radius, construction
//! progress, selling, repair, defensive-turret targeting, service-depot
//! repair auras, and air-base slot lifecycle. All calculations use
//! fixed-point math for deterministic simulation.

use serde::{Deserialize, Serialize};

use crate::combat::ArmorClass;
use crate::components::EntityId;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::pathfinding::{CellType, NavGrid};

// ============================================================================
// Placement Grid
// ============================================================================

/// State of a cell in the placement grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementCell {
    /// Cell is empty and available for building.
    Empty,
    /// Cell is occupied by a building entity.
    Occupied(EntityId),
    /// Cell is blocked by terrain or resources.
    Blocked,
}

impl Default for PlacementCell {
    fn default() -> Self {
        Self::Empty
    }
}

/// Grid for tracking building placement.
///
/// Separate from NavGrid to allow independent tracking of building
/// footprints vs navigation obstacles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementGrid {
    width: u32,
    height: u32,
    cells: Vec<PlacementCell>,
    #[serde(with = "fixed_serde")]
    cell_size: Fixed,
}

impl PlacementGrid {
    /// Create a new placement grid with all cells empty.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero, or if `cell_size` is not positive.
    #[must_use]
    pub fn new(width: u32, height: u32, cell_size: Fixed) -> Self {
        assert!(width > 0, "PlacementGrid width must be positive");
        assert!(height > 0, "PlacementGrid height must be positive");
        assert!(
            cell_size > Fixed::ZERO,
            "PlacementGrid cell_size must be positive"
        );

        let cell_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![PlacementCell::Empty; cell_count],
            cell_size,
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cell size in world units.
    #[must_use]
    pub const fn cell_size(&self) -> Fixed {
        self.cell_size
    }

    #[inline]
    fn coords_to_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Check if coordinates are within grid bounds.
    #[must_use]
    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Get cell state at coordinates. Returns `None` if out of bounds.
    #[must_use]
    pub fn get_cell(&self, x: u32, y: u32) -> Option<PlacementCell> {
        if self.in_bounds(x, y) {
            Some(self.cells[self.coords_to_index(x, y)])
        } else {
            None
        }
    }

    /// Set cell state at coordinates. Returns `false` if out of bounds.
    pub fn set_cell(&mut self, x: u32, y: u32, cell: PlacementCell) -> bool {
        if self.in_bounds(x, y) {
            let index = self.coords_to_index(x, y);
            self.cells[index] = cell;
            true
        } else {
            false
        }
    }

    /// Convert world position to grid coordinates.
    #[must_use]
    pub fn world_to_grid(&self, pos: Vec2Fixed) -> Option<(u32, u32)> {
        if pos.x < Fixed::ZERO || pos.y < Fixed::ZERO {
            return None;
        }

        let x = (pos.x / self.cell_size).to_num::<i64>();
        let y = (pos.y / self.cell_size).to_num::<i64>();

        if x >= 0 && x < self.width as i64 && y >= 0 && y < self.height as i64 {
            Some((x as u32, y as u32))
        } else {
            None
        }
    }

    /// Convert grid coordinates to world position (corner of cell).
    #[must_use]
    pub fn grid_to_world(&self, x: u32, y: u32) -> Vec2Fixed {
        Vec2Fixed::new(
            Fixed::from_num(x) * self.cell_size,
            Fixed::from_num(y) * self.cell_size,
        )
    }

    /// Snap a world position to grid alignment.
    #[must_use]
    pub fn snap_to_grid(&self, pos: Vec2Fixed) -> Vec2Fixed {
        let x = (pos.x / self.cell_size).floor() * self.cell_size;
        let y = (pos.y / self.cell_size).floor() * self.cell_size;
        Vec2Fixed::new(x, y)
    }

    /// Check if a cell is available for placement.
    #[must_use]
    pub fn is_available(&self, x: u32, y: u32) -> bool {
        matches!(self.get_cell(x, y), Some(PlacementCell::Empty))
    }

    /// Mark cells as occupied by a building. Returns `false` if any cell is
    /// out of bounds.
    pub fn occupy_cells(
        &mut self,
        start_x: u32,
        start_y: u32,
        footprint: &BuildingFootprint,
        entity_id: EntityId,
    ) -> bool {
        for dy in 0..footprint.height {
            for dx in 0..footprint.width {
                if !self.in_bounds(start_x + dx, start_y + dy) {
                    return false;
                }
            }
        }

        for dy in 0..footprint.height {
            for dx in 0..footprint.width {
                self.set_cell(
                    start_x + dx,
                    start_y + dy,
                    PlacementCell::Occupied(entity_id),
                );
            }
        }

        true
    }

    /// Clear cells occupied by a building.
    pub fn clear_cells(&mut self, start_x: u32, start_y: u32, footprint: &BuildingFootprint) {
        for dy in 0..footprint.height {
            for dx in 0..footprint.width {
                let x = start_x + dx;
                let y = start_y + dy;
                if self.in_bounds(x, y) {
                    self.set_cell(x, y, PlacementCell::Empty);
                }
            }
        }
    }
}

// ============================================================================
// Building Footprint
// ============================================================================

/// Defines the size of a building in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingFootprint {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl BuildingFootprint {
    /// Create a new building footprint.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Create a square footprint.
    #[must_use]
    pub const fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    /// Get the total number of cells this footprint covers.
    #[must_use]
    pub const fn cell_count(&self) -> u32 {
        self.width * self.height
    }
}

impl Default for BuildingFootprint {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

// ============================================================================
// Placement Validation
// ============================================================================

/// Minimum distance in cells from resource nodes.
pub const MIN_RESOURCE_DISTANCE: u32 = 2;

/// A new building must lie within this range of an existing non-defense
/// friendly building, except for a player's very first placement (§4.7).
pub const BUILD_RADIUS: Fixed = Fixed::from_bits(400 << 32);

/// Result of placement validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementResult {
    /// Placement is valid.
    Valid,
    /// One or more cells are blocked.
    Blocked {
        /// List of blocked cell coordinates.
        cells: Vec<(u32, u32)>,
    },
    /// Building would be placed outside grid bounds.
    OutOfBounds,
    /// Building is too close to a resource node.
    TooCloseToResource,
    /// No existing friendly building lies within `BUILD_RADIUS`.
    OutOfBuildRange,
}

impl PlacementResult {
    /// Check if placement is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, PlacementResult::Valid)
    }
}

/// Check if a building can be placed at the given position.
#[must_use]
pub fn can_place_building(
    grid: &PlacementGrid,
    position: Vec2Fixed,
    footprint: &BuildingFootprint,
) -> PlacementResult {
    let Some((start_x, start_y)) = grid.world_to_grid(position) else {
        return PlacementResult::OutOfBounds;
    };

    if start_x + footprint.width > grid.width() || start_y + footprint.height > grid.height() {
        return PlacementResult::OutOfBounds;
    }

    let mut blocked_cells = Vec::new();

    for dy in 0..footprint.height {
        for dx in 0..footprint.width {
            let x = start_x + dx;
            let y = start_y + dy;

            match grid.get_cell(x, y) {
                Some(PlacementCell::Empty) => {}
                Some(PlacementCell::Occupied(_)) | Some(PlacementCell::Blocked) => {
                    blocked_cells.push((x, y));
                }
                None => {
                    return PlacementResult::OutOfBounds;
                }
            }
        }
    }

    if blocked_cells.is_empty() {
        PlacementResult::Valid
    } else {
        PlacementResult::Blocked {
            cells: blocked_cells,
        }
    }
}

/// Check placement, including resource proximity and build-radius rules.
///
/// `friendly_non_defense_positions` lists positions of the placing player's
/// existing buildings that are not themselves defensive structures (turrets,
/// SAM sites); an empty list (the player's very first building) always
/// passes the radius check (§4.7).
#[must_use]
pub fn can_place_building_full(
    grid: &PlacementGrid,
    position: Vec2Fixed,
    footprint: &BuildingFootprint,
    resource_positions: &[(u32, u32)],
    friendly_non_defense_positions: &[Vec2Fixed],
) -> PlacementResult {
    let basic_result = can_place_building(grid, position, footprint);
    if !basic_result.is_valid() {
        return basic_result;
    }

    if !friendly_non_defense_positions.is_empty()
        && !friendly_non_defense_positions
            .iter()
            .any(|&other| position.distance(other) <= BUILD_RADIUS)
    {
        return PlacementResult::OutOfBuildRange;
    }

    let Some((start_x, start_y)) = grid.world_to_grid(position) else {
        return PlacementResult::OutOfBounds;
    };

    for &(res_x, res_y) in resource_positions {
        for dy in 0..footprint.height {
            for dx in 0..footprint.width {
                let x = start_x + dx;
                let y = start_y + dy;
                let dist_x = x.abs_diff(res_x);
                let dist_y = y.abs_diff(res_y);
                let distance = dist_x.max(dist_y);

                if distance < MIN_RESOURCE_DISTANCE {
                    return PlacementResult::TooCloseToResource;
                }
            }
        }
    }

    PlacementResult::Valid
}

// ============================================================================
// Construction
// ============================================================================

/// Events generated by the construction system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstructionEvent {
    /// Construction has progressed.
    ConstructionProgress {
        /// The building entity.
        building: EntityId,
        /// Current progress in ticks.
        progress: u32,
        /// Total construction time in ticks.
        total: u32,
    },
    /// Construction has completed.
    ConstructionComplete {
        /// The building entity.
        building: EntityId,
    },
}

/// Advance construction for a single building's tick counters.
///
/// Returns `true` if construction just completed this call. Operates
/// directly on `entities::EntityKind::Building`'s `construction_ticks` /
/// `construction_ticks_total` fields rather than a separate component.
pub fn advance_construction(ticks: &mut u32, ticks_total: u32) -> bool {
    if *ticks >= ticks_total {
        return false;
    }
    *ticks += 1;
    *ticks >= ticks_total
}

// ============================================================================
// Sell / Repair
// ============================================================================

/// Percent of nominal cost refunded when selling a building, before scaling
/// by current HP fraction (§4.7).
pub const SELL_RETURN_PERCENT: u32 = 50;

/// Compute the sell refund for a building: `cost * sellReturnPercent *
/// (hp / maxHp)`.
#[must_use]
pub fn sell_refund(cost: u32, hp: u32, max_hp: u32) -> u32 {
    if max_hp == 0 {
        return 0;
    }
    let scaled = u64::from(cost) * u64::from(SELL_RETURN_PERCENT) * u64::from(hp);
    (scaled / (100 * u64::from(max_hp))) as u32
}

/// Ticks over which a building fully repairs from zero to `max_hp`, matching
/// the production build-tick base (§4.7).
pub const REPAIR_TICK_BASE: u32 = 600;

/// Percent of nominal cost charged per tick of repair progress (of the full
/// `max_hp -> max_hp` repair), before dividing by `REPAIR_TICK_BASE`.
pub const REPAIR_COST_PERCENT: u32 = 100;

/// Per-tick hp healed while repairing: `max_hp / REPAIR_TICK_BASE`.
#[must_use]
pub fn repair_rate(max_hp: u32) -> u32 {
    (max_hp / REPAIR_TICK_BASE).max(1)
}

/// Per-tick credit cost while repairing: `(cost * repairCostPercent) /
/// REPAIR_TICK_BASE`.
#[must_use]
pub fn repair_tick_cost(cost: u32) -> u32 {
    (cost * REPAIR_COST_PERCENT) / (100 * REPAIR_TICK_BASE).max(1)
}

/// Apply one tick of repair. Returns `(new_hp, still_repairing)`; clears
/// `is_repairing` if the owner cannot afford the tick cost.
pub fn tick_repair(hp: u32, max_hp: u32, cost: u32, credits: &mut u32) -> (u32, bool) {
    if hp >= max_hp {
        return (hp, false);
    }
    let tick_cost = repair_tick_cost(cost);
    if *credits < tick_cost {
        return (hp, false);
    }
    *credits -= tick_cost;
    let new_hp = (hp + repair_rate(max_hp)).min(max_hp);
    (new_hp, new_hp < max_hp)
}

// ============================================================================
// Defensive Turrets
// ============================================================================

/// A candidate target for a defensive turret's spatial enemy query.
#[derive(Debug, Clone, Copy)]
pub struct TurretCandidate {
    /// Candidate entity id.
    pub id: EntityId,
    /// Candidate position.
    pub position: Vec2Fixed,
    /// Candidate armor class.
    pub armor_class: ArmorClass,
}

/// Select a turret's target from nearby enemies, preferring airborne targets
/// for SAM-style (`prefers_air`) defenses; otherwise nearest (§4.7).
#[must_use]
pub fn select_turret_target(
    turret_position: Vec2Fixed,
    range: Fixed,
    candidates: &[TurretCandidate],
    prefers_air: bool,
) -> Option<EntityId> {
    let in_range = candidates
        .iter()
        .filter(|c| turret_position.distance(c.position) <= range);

    let best = if prefers_air {
        in_range
            .clone()
            .find(|c| c.armor_class == ArmorClass::Air)
            .or_else(|| {
                in_range.min_by_key(|c| turret_position.distance(c.position).to_bits())
            })
    } else {
        in_range.min_by_key(|c| turret_position.distance(c.position).to_bits())
    };

    best.map(|c| c.id)
}

// ============================================================================
// Service Depot
// ============================================================================

/// A candidate for the service depot's repair aura.
#[derive(Debug, Clone, Copy)]
pub struct RepairAuraCandidate {
    /// Candidate entity id.
    pub id: EntityId,
    /// Candidate position.
    pub position: Vec2Fixed,
    /// Candidate current hp.
    pub hp: u32,
    /// Candidate max hp.
    pub max_hp: u32,
    /// Candidate collision radius.
    pub radius: Fixed,
}

/// Heal amount applied by the service depot's aura per affected vehicle per
/// tick (§4.7).
pub const SERVICE_DEPOT_REPAIR_RATE: u32 = 5;

/// Run the service depot's repair aura for one tick over nearby damaged
/// friendly ground vehicles. Returns `(entity_id, new_hp)` pairs healed.
/// Skipped entirely (returns empty) if the owner is power-starved.
pub fn service_depot_tick(
    depot_position: Vec2Fixed,
    repair_radius: Fixed,
    candidates: &[RepairAuraCandidate],
    power_starved: bool,
) -> Vec<(EntityId, u32)> {
    if power_starved {
        return Vec::new();
    }

    candidates
        .iter()
        .filter(|c| c.hp < c.max_hp)
        .filter(|c| depot_position.distance(c.position) <= repair_radius + c.radius)
        .map(|c| {
            (
                c.id,
                (c.hp + SERVICE_DEPOT_REPAIR_RATE).min(c.max_hp),
            )
        })
        .collect()
}

// ============================================================================
// Air Base Slot Lifecycle
// ============================================================================

/// Number of dock slots per air base (§4.7, §3).
pub const AIR_BASE_SLOTS: usize = 6;

/// Ticks a docked, empty-ammo harrier takes to fully reload.
pub const RELOAD_TICKS: u32 = 120;

/// Ticks between each staggered launch check.
pub const LAUNCH_DELAY: u32 = 15;

/// Hp healed per docked-harrier heal pulse.
pub const DOCKED_HEAL_AMOUNT: u32 = 2;

/// Ticks between docked-harrier heal pulses.
pub const DOCKED_HEAL_INTERVAL: u32 = 5;

/// One dock slot in an air base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirBaseSlot {
    /// Occupying harrier entity, if any.
    pub harrier: Option<EntityId>,
    /// Ticks remaining until the occupant's ammo refills.
    pub reload_progress: u32,
}

impl AirBaseSlot {
    /// An unoccupied slot.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            harrier: None,
            reload_progress: 0,
        }
    }
}

impl Default for AirBaseSlot {
    fn default() -> Self {
        Self::empty()
    }
}

/// An air base's fixed-size slot array and launch timing state (§3, §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirBase {
    /// Fixed-size dock slots.
    pub slots: [AirBaseSlot; AIR_BASE_SLOTS],
    /// Tick of the last harrier launch, for staggering launch checks.
    pub last_launch_tick: u64,
}

impl AirBase {
    /// A freshly built air base with all slots empty.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [AirBaseSlot::empty(); AIR_BASE_SLOTS],
            last_launch_tick: 0,
        }
    }

    /// Find the first empty slot, if any.
    #[must_use]
    pub fn first_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.harrier.is_none())
    }

    /// Dock a harrier into the first empty slot. Returns the slot index, or
    /// `None` if the base is full.
    pub fn dock(&mut self, harrier: EntityId) -> Option<usize> {
        let index = self.first_empty_slot()?;
        self.slots[index].harrier = Some(harrier);
        self.slots[index].reload_progress = 0;
        Some(index)
    }

    /// Clear a slot (harrier launched or lost).
    pub fn clear_slot(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = AirBaseSlot::empty();
        }
    }

    /// Advance reload timers for docked harriers below max ammo. Returns
    /// slot indices whose occupant just finished reloading.
    pub fn tick_reload(&mut self, ammo_below_max: impl Fn(EntityId) -> bool) -> Vec<usize> {
        let mut refilled = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(harrier) = slot.harrier else { continue };
            if !ammo_below_max(harrier) {
                continue;
            }
            if slot.reload_progress == 0 {
                slot.reload_progress = RELOAD_TICKS;
            }
            slot.reload_progress -= 1;
            if slot.reload_progress == 0 {
                refilled.push(index);
            }
        }
        refilled
    }

    /// Find a docked slot holding a harrier with ammo and a target, eligible
    /// to launch on this `launch_delay`-staggered check.
    pub fn find_launch_candidate(
        &self,
        tick: u64,
        has_target_and_ammo: impl Fn(EntityId) -> bool,
    ) -> Option<(usize, EntityId)> {
        if tick.saturating_sub(self.last_launch_tick) < u64::from(LAUNCH_DELAY) {
            return None;
        }
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            slot.harrier
                .filter(|&h| has_target_and_ammo(h))
                .map(|h| (index, h))
        })
    }

    /// Reconcile "lost" harriers: entities that believe they are docked at
    /// this base but are missing from any slot. Returns the slot they were
    /// re-docked into, run as a periodic self-healing pass (§4.7, §9).
    pub fn reconcile_lost(&mut self, believed_docked: &[EntityId]) -> Vec<EntityId> {
        let mut redocked = Vec::new();
        for &harrier in believed_docked {
            let present = self.slots.iter().any(|s| s.harrier == Some(harrier));
            if !present {
                if self.dock(harrier).is_some() {
                    redocked.push(harrier);
                }
            }
        }
        redocked
    }
}

impl Default for AirBase {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// NavGrid Integration
// ============================================================================

/// Mark cells in the NavGrid as blocked when a building is placed.
pub fn mark_building_in_navgrid(
    nav_grid: &mut NavGrid,
    placement_grid: &PlacementGrid,
    position: Vec2Fixed,
    footprint: &BuildingFootprint,
) {
    if let Some((start_x, start_y)) = placement_grid.world_to_grid(position) {
        for dy in 0..footprint.height {
            for dx in 0..footprint.width {
                let x = start_x + dx;
                let y = start_y + dy;
                nav_grid.set_cell(x, y, CellType::Blocked);
            }
        }
    }
}

/// Clear cells in the NavGrid when a building is destroyed.
pub fn clear_building_from_navgrid(
    nav_grid: &mut NavGrid,
    placement_grid: &PlacementGrid,
    position: Vec2Fixed,
    footprint: &BuildingFootprint,
) {
    if let Some((start_x, start_y)) = placement_grid.world_to_grid(position) {
        for dy in 0..footprint.height {
            for dx in 0..footprint.width {
                let x = start_x + dx;
                let y = start_y + dy;
                nav_grid.set_cell(x, y, CellType::Walkable);
            }
        }
    }
}

/// Place a building, updating both placement grid and nav grid.
pub fn place_building(
    placement_grid: &mut PlacementGrid,
    nav_grid: &mut NavGrid,
    position: Vec2Fixed,
    footprint: &BuildingFootprint,
    entity_id: EntityId,
) -> bool {
    if !can_place_building(placement_grid, position, footprint).is_valid() {
        return false;
    }

    let Some((start_x, start_y)) = placement_grid.world_to_grid(position) else {
        return false;
    };

    if !placement_grid.occupy_cells(start_x, start_y, footprint, entity_id) {
        return false;
    }

    mark_building_in_navgrid(nav_grid, placement_grid, position, footprint);

    true
}

/// Remove a building, updating both placement grid and nav grid.
pub fn remove_building(
    placement_grid: &mut PlacementGrid,
    nav_grid: &mut NavGrid,
    position: Vec2Fixed,
    footprint: &BuildingFootprint,
) {
    if let Some((start_x, start_y)) = placement_grid.world_to_grid(position) {
        placement_grid.clear_cells(start_x, start_y, footprint);
        clear_building_from_navgrid(nav_grid, placement_grid, position, footprint);
    }
}

// ============================================================================
// Tests
// ============================================================================
