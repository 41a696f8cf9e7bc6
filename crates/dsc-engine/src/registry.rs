//! Approved collateral registry
//!
//! Maps each approved asset to its oracle feed and native decimal
//! precision; everything else in the engine prices collateral through
//! this table

use std::collections::HashMap;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::error::{error_msg, EngineError};

/// Configuration for one approved collateral asset
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollateralConfig {
    /// Asset identifier
    pub asset: Pubkey,
    /// Oracle feed the asset is priced against
    pub feed: Pubkey,
    /// Native decimal precision of asset amounts
    pub decimals: u8,
}

/// The approved collateral set
#[derive(Debug, Clone, Default)]
pub struct CollateralRegistry {
    configs: Vec<CollateralConfig>,
    index: HashMap<Pubkey, usize>,
}

impl CollateralRegistry {
    /// Build from parallel sequences of assets, oracle feeds, and decimals
    ///
    /// Any length mismatch is a configuration error. A repeated asset
    /// updates the earlier entry in place, keeping first-appearance order.
    pub fn new(
        assets: &[Pubkey],
        feeds: &[Pubkey],
        decimals: &[u8],
    ) -> Result<Self, EngineError> {
        if assets.len() != feeds.len() || assets.len() != decimals.len() {
            return error_msg(
                EngineError::ConfigMismatch,
                "asset, feed, and decimal sequences differ in length",
            );
        }

        let mut registry = Self {
            configs: Vec::with_capacity(assets.len()),
            index: HashMap::with_capacity(assets.len()),
        };
        for i in 0..assets.len() {
            let config = CollateralConfig {
                asset: assets[i],
                feed: feeds[i],
                decimals: decimals[i],
            };
            match registry.index.get(&assets[i]) {
                Some(&pos) => registry.configs[pos] = config,
                None => {
                    registry.index.insert(assets[i], registry.configs.len());
                    registry.configs.push(config);
                }
            }
        }
        Ok(registry)
    }

    /// Look up the configuration for an asset
    pub fn config(&self, asset: &Pubkey) -> Result<&CollateralConfig, EngineError> {
        self.index
            .get(asset)
            .map(|&pos| &self.configs[pos])
            .ok_or(EngineError::UnsupportedAsset)
    }

    pub fn is_approved(&self, asset: &Pubkey) -> bool {
        self.index.contains_key(asset)
    }

    /// Approved configurations in first-insertion order
    pub fn configs(&self) -> &[CollateralConfig] {
        &self.configs
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
