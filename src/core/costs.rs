//! Cost system for activated effects
//!
//! Represents what a player gives up to activate an effect: cards from hand,
//! life points, resource points, tributes and banishments. Costs are paid
//! before the chain link exists (see `game::cost_payment`).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A cost that must be paid to activate an effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cost {
    /// Discard N cards from hand (player picks which)
    Discard { count: u8 },

    /// Discard the activating card itself
    DiscardSelf,

    /// Pay life points
    PayLife { amount: i32 },

    /// Pay from the resource pool
    PayResource { amount: i32 },

    /// Tribute N monsters you control
    Tribute { count: u8 },

    /// Tribute the activating monster
    TributeSelf,

    /// Banish N cards from your graveyard
    Banish { count: u8 },

    /// Banish the activating card from your graveyard
    BanishSelf,

    /// Several costs paid together ("discard 1 card and pay 500 LP")
    Composite(Vec<Cost>),
}

impl Cost {
    /// Flatten composites into their leaf costs
    pub fn components(&self) -> SmallVec<[&Cost; 2]> {
        let mut out = SmallVec::new();
        self.collect_components(&mut out);
        out
    }

    fn collect_components<'a>(&'a self, out: &mut SmallVec<[&'a Cost; 2]>) {
        match self {
            Cost::Composite(costs) => {
                for cost in costs {
                    cost.collect_components(out);
                }
            }
            other => out.push(other),
        }
    }

    /// Does paying this cost involve choosing cards?
    pub fn requires_selection(&self) -> bool {
        self.components().iter().any(|c| {
            matches!(
                c,
                Cost::Discard { .. } | Cost::Tribute { .. } | Cost::Banish { .. }
            )
        })
    }

    /// Total life points paid
    pub fn life_amount(&self) -> i32 {
        self.components()
            .iter()
            .map(|c| match c {
                Cost::PayLife { amount } => *amount,
                _ => 0,
            })
            .sum()
    }

    /// Total resource points paid
    pub fn resource_amount(&self) -> i32 {
        self.components()
            .iter()
            .map(|c| match c {
                Cost::PayResource { amount } => *amount,
                _ => 0,
            })
            .sum()
    }

    pub fn describe(&self) -> String {
        match self {
            Cost::Discard { count } => format!("discard {count} card(s)"),
            Cost::DiscardSelf => "discard this card".to_string(),
            Cost::PayLife { amount } => format!("pay {amount} LP"),
            Cost::PayResource { amount } => format!("pay {amount} resources"),
            Cost::Tribute { count } => format!("tribute {count} monster(s)"),
            Cost::TributeSelf => "tribute this card".to_string(),
            Cost::Banish { count } => format!("banish {count} card(s) from your graveyard"),
            Cost::BanishSelf => "banish this card from your graveyard".to_string(),
            Cost::Composite(costs) => costs
                .iter()
                .map(|c| c.describe())
                .collect::<Vec<_>>()
                .join(" and "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_components() {
        let cost = Cost::Composite(vec![
            Cost::Discard { count: 1 },
            Cost::PayLife { amount: 500 },
            Cost::Composite(vec![Cost::PayResource { amount: 2 }]),
        ]);
        assert_eq!(cost.components().len(), 3);
        assert!(cost.requires_selection());
        assert_eq!(cost.life_amount(), 500);
        assert_eq!(cost.resource_amount(), 2);
    }

    #[test]
    fn test_self_costs_need_no_selection() {
        assert!(!Cost::DiscardSelf.requires_selection());
        assert!(!Cost::PayLife { amount: 1000 }.requires_selection());
        assert!(Cost::Tribute { count: 1 }.requires_selection());
    }

    #[test]
    fn test_describe() {
        let cost = Cost::Composite(vec![Cost::Discard { count: 1 }, Cost::PayLife { amount: 500 }]);
        assert_eq!(cost.describe(), "discard 1 card(s) and pay 500 LP");
    }
}
