use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AugmentationError {
    #[error("not eligible: target is not a weapon")]
    NotAWeapon,
    #[error("not eligible: weapon is currently equipped")]
    WeaponEquipped,
    #[error("not eligible: weapon is already augmented")]
    AlreadyAugmented,
    #[error("not eligible: life stone id {0} is outside the valid range")]
    InvalidLifeStone(u32),
}
