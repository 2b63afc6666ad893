use rand::Rng;

use crate::catalyst::decode_grade;
use crate::cost::{gemstone_cost, CrystalGrade, GemstoneCost};
use crate::error::AugmentationError;
use crate::roll::{roll_augmentation, AugmentationRoll};

/// The minimal facts about the target weapon the pure policy function
/// needs (spec §4.9). Ownership of the actual item/inventory model lives
/// outside this crate.
#[derive(Debug, Clone, Copy)]
pub struct AugmentationTarget {
    pub is_weapon: bool,
    pub equipped: bool,
    pub already_augmented: bool,
    pub crystal_grade: CrystalGrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AugmentationOutcome {
    pub roll: AugmentationRoll,
    pub gemstone_cost: Option<GemstoneCost>,
}

/// Validates eligibility, decodes the life stone, rolls the augmentation,
/// and prices it — all as one pure function over its inputs plus an
/// injected random source (spec §4.9 mandates a CSPRNG for every roll
/// here).
pub fn augment(
    target: AugmentationTarget,
    life_stone_id: u32,
    rng: &mut impl Rng,
) -> Result<AugmentationOutcome, AugmentationError> {
    if !target.is_weapon {
        return Err(AugmentationError::NotAWeapon);
    }
    if target.equipped {
        return Err(AugmentationError::WeaponEquipped);
    }
    if target.already_augmented {
        return Err(AugmentationError::AlreadyAugmented);
    }

    let grade = decode_grade(life_stone_id)?;
    let roll = roll_augmentation(grade, rng);
    let gemstone_cost = gemstone_cost(target.crystal_grade);

    log::info!(
        target: "augmentation",
        "life stone {life_stone_id} (grade {grade}) rolled augmentation {} ({:?})",
        roll.augmentation_id,
        roll.band,
    );

    Ok(AugmentationOutcome { roll, gemstone_cost })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalyst::LIFE_STONE_BASE;
    use rand::rngs::OsRng;

    fn eligible_target() -> AugmentationTarget {
        AugmentationTarget {
            is_weapon: true,
            equipped: false,
            already_augmented: false,
            crystal_grade: CrystalGrade::S,
        }
    }

    #[test]
    fn rejects_non_weapon_targets() {
        let mut target = eligible_target();
        target.is_weapon = false;
        let mut rng = OsRng;
        assert_eq!(augment(target, LIFE_STONE_BASE, &mut rng), Err(AugmentationError::NotAWeapon));
    }

    #[test]
    fn rejects_equipped_weapons() {
        let mut target = eligible_target();
        target.equipped = true;
        let mut rng = OsRng;
        assert_eq!(augment(target, LIFE_STONE_BASE, &mut rng), Err(AugmentationError::WeaponEquipped));
    }

    #[test]
    fn rejects_already_augmented_weapons() {
        let mut target = eligible_target();
        target.already_augmented = true;
        let mut rng = OsRng;
        assert_eq!(
            augment(target, LIFE_STONE_BASE, &mut rng),
            Err(AugmentationError::AlreadyAugmented)
        );
    }

    #[test]
    fn rejects_an_out_of_range_life_stone() {
        let mut rng = OsRng;
        assert_eq!(
            augment(eligible_target(), 1, &mut rng),
            Err(AugmentationError::InvalidLifeStone(1))
        );
    }

    #[test]
    fn a_valid_roll_prices_its_gemstone_cost_from_the_crystal_grade() {
        let mut rng = OsRng;
        let outcome = augment(eligible_target(), LIFE_STONE_BASE, &mut rng).unwrap();
        assert_eq!(outcome.gemstone_cost.unwrap().count, 25);
    }

    #[test]
    fn no_grade_weapons_augment_for_free() {
        let mut target = eligible_target();
        target.crystal_grade = CrystalGrade::NoGrade;
        let mut rng = OsRng;
        let outcome = augment(target, LIFE_STONE_BASE, &mut rng).unwrap();
        assert!(outcome.gemstone_cost.is_none());
    }
}
