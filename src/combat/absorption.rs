//! Armor-then-hull absorption. Damage depletes the exposed unit's armor, then its hull; a unit whose
//! hull reaches zero is destroyed and any remaining damage carries into the next unit of the stack.

use crate::combat::stack::StackState;

/// Apply `damage` to `target` and return the number of units destroyed.
pub fn absorb(target: &mut StackState, damage: f64) -> u32 {
    let mut remaining = damage;
    let mut destroyed = 0;

    while remaining > 0.0 && target.units > 0 {
        if target.current_armor > 0.0 {
            let absorbed = target.current_armor.min(remaining);
            target.current_armor -= absorbed;
            remaining -= absorbed;
            if target.current_armor == 0.0 && target.armor_per_unit > 0.0 {
                target.current_hull = target.hull_per_unit;
            }
        } else {
            if target.current_hull == 0.0 {
                target.current_hull = target.hull_per_unit;
            }
            let taken = target.current_hull.min(remaining);
            target.current_hull -= taken;
            remaining -= taken;
            if target.current_hull == 0.0 {
                target.units -= 1;
                destroyed += 1;
                target.reset_pools();
            }
        }
    }

    destroyed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::stack::Side;
    use crate::data::tech::TechBonuses;
    use crate::data::units::{UnitRegistry, STORM_FRIGATE};

    // Storm frigate: 65 armor, 80 hull per unit.
    fn frigates(units: u32) -> StackState {
        let registry = UnitRegistry::builtin();
        let profile = registry.profile(STORM_FRIGATE).expect("builtin type");
        StackState::new(Side::Defender, profile, units, TechBonuses::default())
    }

    #[test]
    fn damage_below_armor_only_scratches_armor() {
        let mut stack = frigates(2);
        assert_eq!(absorb(&mut stack, 40.0), 0);
        assert_eq!(stack.current_armor, 25.0);
        assert_eq!(stack.current_hull, 80.0);
        assert_eq!(stack.units, 2);
    }

    #[test]
    fn damage_spills_from_armor_into_hull() {
        let mut stack = frigates(2);
        assert_eq!(absorb(&mut stack, 100.0), 0);
        assert_eq!(stack.current_armor, 0.0);
        assert_eq!(stack.current_hull, 45.0);
    }

    #[test]
    fn exact_kill_destroys_one_unit_and_resets_pools() {
        let mut stack = frigates(2);
        assert_eq!(absorb(&mut stack, 145.0), 1);
        assert_eq!(stack.units, 1);
        assert_eq!(stack.current_armor, 65.0);
        assert_eq!(stack.current_hull, 80.0);
    }

    #[test]
    fn overflow_bleeds_through_multiple_units() {
        let mut stack = frigates(4);
        // two full units (290) and 10 into the third unit's armor
        assert_eq!(absorb(&mut stack, 300.0), 2);
        assert_eq!(stack.units, 2);
        assert_eq!(stack.current_armor, 55.0);
        assert_eq!(stack.current_hull, 80.0);
    }

    #[test]
    fn damage_beyond_stack_is_discarded() {
        let mut stack = frigates(2);
        assert_eq!(absorb(&mut stack, 10_000.0), 2);
        assert_eq!(stack.units, 0);
    }

    #[test]
    fn partial_hull_damage_persists_between_volleys() {
        let mut stack = frigates(1);
        absorb(&mut stack, 100.0);
        assert_eq!(absorb(&mut stack, 44.0), 0);
        assert_eq!(stack.current_hull, 1.0);
        assert_eq!(absorb(&mut stack, 1.0), 1);
        assert_eq!(stack.units, 0);
    }

    #[test]
    fn zero_or_negative_damage_is_a_no_op() {
        let mut stack = frigates(1);
        let before = stack.clone();
        assert_eq!(absorb(&mut stack, 0.0), 0);
        assert_eq!(absorb(&mut stack, -5.0), 0);
        assert_eq!(stack, before);
    }

    #[test]
    fn armorless_units_enter_hull_phase_directly() {
        let mut stack = frigates(2);
        stack.armor_per_unit = 0.0;
        stack.current_armor = 0.0;
        assert_eq!(absorb(&mut stack, 170.0), 2);
        assert_eq!(stack.units, 0);
    }

    #[test]
    fn pools_stay_within_per_unit_bounds() {
        let mut stack = frigates(5);
        for chunk in [13.5, 70.25, 140.0, 3.0, 299.9, 1.1] {
            absorb(&mut stack, chunk);
            assert!(stack.current_armor >= 0.0 && stack.current_armor <= stack.armor_per_unit);
            assert!(stack.current_hull >= 0.0 && stack.current_hull <= stack.hull_per_unit);
        }
    }
}
