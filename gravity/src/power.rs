//! Validator power
//!
//! Bonded stake is read through the [`PowerSource`] trait so the attestation
//! engine and valset manager never depend on where stake comes from. The
//! contract itself uses [`StoredPower`], a snapshot kept in storage and fed by
//! the admin through `UpdateValidatorPowers`.

use cosmwasm_std::{Addr, Order, StdResult, Storage};

use crate::state::{TOTAL_POWER, VALIDATOR_POWERS};

/// Normalized power scale, the largest u32
pub const MAX_POWER: u64 = u32::MAX as u64;

/// Two thirds of [`MAX_POWER`], the threshold enforced by the Ethereum contract
pub const POWER_THRESHOLD: u64 = 2_863_311_530;

/// Read access to bonded validator power
pub trait PowerSource {
    /// Sum of all bonded power
    fn total_power(&self, storage: &dyn Storage) -> StdResult<u64>;

    /// Bonded power of one validator, zero if unknown
    fn power_of(&self, storage: &dyn Storage, validator: &Addr) -> StdResult<u64>;

    /// Every validator with non-zero power
    fn validators(&self, storage: &dyn Storage) -> StdResult<Vec<(Addr, u64)>>;
}

/// Storage-backed power snapshot
pub struct StoredPower;

impl PowerSource for StoredPower {
    fn total_power(&self, storage: &dyn Storage) -> StdResult<u64> {
        Ok(TOTAL_POWER.may_load(storage)?.unwrap_or_default())
    }

    fn power_of(&self, storage: &dyn Storage, validator: &Addr) -> StdResult<u64> {
        Ok(VALIDATOR_POWERS
            .may_load(storage, validator)?
            .unwrap_or_default())
    }

    fn validators(&self, storage: &dyn Storage) -> StdResult<Vec<(Addr, u64)>> {
        VALIDATOR_POWERS
            .range(storage, None, None, Order::Ascending)
            .filter(|item| !matches!(item, Ok((_, 0))))
            .collect()
    }
}

/// Set a validator's power in the stored snapshot, keeping the total in sync.
/// Zero power removes the validator.
pub fn set_validator_power(storage: &mut dyn Storage, validator: &Addr, power: u64) -> StdResult<()> {
    let previous = VALIDATOR_POWERS
        .may_load(storage, validator)?
        .unwrap_or_default();
    let total = TOTAL_POWER.may_load(storage)?.unwrap_or_default();
    let total = total.saturating_sub(previous).saturating_add(power);

    if power == 0 {
        VALIDATOR_POWERS.remove(storage, validator);
    } else {
        VALIDATOR_POWERS.save(storage, validator, &power)?;
    }
    TOTAL_POWER.save(storage, &total)
}

/// Scale `power` onto `0..=MAX_POWER` relative to `total`, rounding down
pub fn normalize_power(power: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (power as u128 * MAX_POWER as u128 / total as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::MockStorage;

    #[test]
    fn test_normalize_equal_validators() {
        assert_eq!(normalize_power(1, 1), 4_294_967_295);
        assert_eq!(normalize_power(5, 10), 2_147_483_647);
        assert_eq!(normalize_power(10, 30), 1_431_655_765);
        assert_eq!(normalize_power(10, 60), 715_827_882);
    }

    #[test]
    fn test_normalize_large_stakes() {
        let total = 1_000_000_000_000_000u64;
        assert_eq!(normalize_power(total, total), MAX_POWER);
        assert_eq!(normalize_power(0, total), 0);
        assert_eq!(normalize_power(7, 0), 0);
    }

    #[test]
    fn test_threshold_boundary() {
        // 33/33/34 stake: the two smallest do not reach two thirds
        let two_small = normalize_power(33, 100) * 2;
        assert_eq!(two_small, 2_834_678_414);
        assert!(two_small < POWER_THRESHOLD);
        assert!(normalize_power(33, 100) + normalize_power(34, 100) >= POWER_THRESHOLD);

        // exactly two of three equal validators
        assert_eq!(normalize_power(1, 3) * 2, POWER_THRESHOLD);
    }

    #[test]
    fn test_stored_power_tracks_total() {
        let mut storage = MockStorage::new();
        let val1 = Addr::unchecked("val1");
        let val2 = Addr::unchecked("val2");

        set_validator_power(&mut storage, &val1, 60).unwrap();
        set_validator_power(&mut storage, &val2, 40).unwrap();
        assert_eq!(StoredPower.total_power(&storage).unwrap(), 100);

        set_validator_power(&mut storage, &val1, 10).unwrap();
        assert_eq!(StoredPower.total_power(&storage).unwrap(), 50);
        assert_eq!(StoredPower.power_of(&storage, &val1).unwrap(), 10);

        set_validator_power(&mut storage, &val2, 0).unwrap();
        assert_eq!(StoredPower.total_power(&storage).unwrap(), 10);
        assert_eq!(
            StoredPower.validators(&storage).unwrap(),
            vec![(val1, 10)]
        );
        assert_eq!(StoredPower.power_of(&storage, &val2).unwrap(), 0);
    }
}
