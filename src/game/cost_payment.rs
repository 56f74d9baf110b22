//! Activation cost validation and payment
//!
//! Costs are checked and paid before a chain link exists. [`GameState::can_pay`]
//! is the advisory query; [`GameState::pay_cost`] re-runs the same plan and
//! only mutates once every component is known to be payable, so a rejected
//! payment leaves the snapshot untouched.
//!
//! Costs that choose among several cards (discard N, tribute N, banish N) need
//! a [`CostPayment`] naming the cards. When the candidates exactly cover the
//! count the cards are picked automatically.

use crate::core::{CardId, Cost, PlayerId};
use crate::game::{GameEvent, GameState};
use crate::zones::Zone;
use crate::{game_log, DuelError, Result};
use serde::{Deserialize, Serialize};

/// Cards a player offers for the selection part of a cost
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostPayment {
    pub cards: Vec<CardId>,
}

impl CostPayment {
    pub fn new(cards: Vec<CardId>) -> Self {
        CostPayment { cards }
    }
}

/// Answer to "can this cost be paid right now?"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostCheck {
    pub ok: bool,
    pub reason: Option<String>,
    /// A [`CostPayment`] must name cards before the cost can be paid
    pub requires_selection: bool,
    pub choices: Vec<CardId>,
    pub min: usize,
    pub max: usize,
}

impl CostCheck {
    fn payable() -> Self {
        CostCheck {
            ok: true,
            reason: None,
            requires_selection: false,
            choices: Vec::new(),
            min: 0,
            max: 0,
        }
    }

    fn refused(reason: String) -> Self {
        CostCheck {
            ok: false,
            reason: Some(reason),
            ..CostCheck::payable()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CostMove {
    Discard,
    Tribute,
    Banish,
}

impl CostMove {
    fn from_zone(&self) -> Zone {
        match self {
            CostMove::Discard => Zone::Hand,
            CostMove::Tribute => Zone::Board,
            CostMove::Banish => Zone::Graveyard,
        }
    }

    fn to_zone(&self) -> Zone {
        match self {
            CostMove::Discard | CostMove::Tribute => Zone::Graveyard,
            CostMove::Banish => Zone::Banished,
        }
    }
}

/// Everything a payment will do, computed without touching the state
#[derive(Debug, Default)]
struct CostPlan {
    life: i32,
    resources: i32,
    moves: Vec<(CardId, CostMove)>,
}

enum Shortfall {
    Unpayable(String),
    NeedsSelection {
        choices: Vec<CardId>,
        count: usize,
    },
}

struct SelectionSlot {
    kind: CostMove,
    candidates: Vec<CardId>,
    count: usize,
}

impl GameState {
    fn plan_cost(
        &self,
        controller: PlayerId,
        source: CardId,
        cost: &Cost,
        proposed: Option<&CostPayment>,
    ) -> std::result::Result<CostPlan, Shortfall> {
        let mut plan = CostPlan::default();
        let mut slots: Vec<SelectionSlot> = Vec::new();

        let source_zone = self
            .cards
            .get(source)
            .ok()
            .filter(|c| c.owner == controller)
            .and_then(|_| self.zone_of(source));

        for component in cost.components() {
            let self_move = match component {
                Cost::DiscardSelf => Some(CostMove::Discard),
                Cost::TributeSelf => Some(CostMove::Tribute),
                Cost::BanishSelf => Some(CostMove::Banish),
                _ => None,
            };
            if let Some(kind) = self_move {
                if source_zone != Some(kind.from_zone()) {
                    return Err(Shortfall::Unpayable(format!(
                        "cannot {}: the card is not in the {:?}",
                        component.describe(),
                        kind.from_zone()
                    )));
                }
                plan.moves.push((source, kind));
                continue;
            }

            let (kind, count) = match component {
                Cost::PayLife { amount } => {
                    plan.life += amount;
                    continue;
                }
                Cost::PayResource { amount } => {
                    plan.resources += amount;
                    continue;
                }
                Cost::Discard { count } => (CostMove::Discard, *count),
                Cost::Tribute { count } => (CostMove::Tribute, *count),
                Cost::Banish { count } => (CostMove::Banish, *count),
                _ => continue,
            };
            let candidates: Vec<CardId> = self
                .cards_in_zone(controller, kind.from_zone())
                .into_iter()
                .filter(|&c| c != source)
                .collect();
            if candidates.len() < count as usize {
                return Err(Shortfall::Unpayable(format!(
                    "cannot {}: only {} card(s) available",
                    component.describe(),
                    candidates.len()
                )));
            }
            slots.push(SelectionSlot {
                kind,
                candidates,
                count: count as usize,
            });
        }

        let player = self
            .player(controller)
            .map_err(|e| Shortfall::Unpayable(e.to_string()))?;
        if plan.life > 0 && player.life <= plan.life {
            return Err(Shortfall::Unpayable(format!(
                "cannot pay {} LP with {} LP left",
                plan.life, player.life
            )));
        }
        if player.resources < plan.resources {
            return Err(Shortfall::Unpayable(format!(
                "cannot pay {} resources with {} available",
                plan.resources, player.resources
            )));
        }

        match proposed {
            Some(payment) => {
                let mut remaining = payment.cards.clone();
                for slot in &slots {
                    let taken: Vec<CardId> = remaining
                        .iter()
                        .copied()
                        .filter(|c| slot.candidates.contains(c))
                        .take(slot.count)
                        .collect();
                    if taken.len() != slot.count {
                        return Err(Shortfall::Unpayable(format!(
                            "the payment names {} of the {} card(s) needed",
                            taken.len(),
                            slot.count
                        )));
                    }
                    remaining.retain(|c| !taken.contains(c));
                    plan.moves.extend(taken.into_iter().map(|c| (c, slot.kind)));
                }
                if let Some(extra) = remaining.first() {
                    return Err(Shortfall::Unpayable(format!(
                        "card {extra} cannot be used to pay this cost"
                    )));
                }
            }
            None => {
                if slots.iter().all(|s| s.candidates.len() == s.count) {
                    for slot in &slots {
                        plan.moves
                            .extend(slot.candidates.iter().map(|&c| (c, slot.kind)));
                    }
                } else {
                    let mut choices: Vec<CardId> = Vec::new();
                    for slot in &slots {
                        choices.extend(slot.candidates.iter().copied());
                    }
                    return Err(Shortfall::NeedsSelection {
                        choices,
                        count: slots.iter().map(|s| s.count).sum(),
                    });
                }
            }
        }

        Ok(plan)
    }

    /// Advisory cost query; never mutates
    pub fn can_pay(
        &self,
        controller: PlayerId,
        source: CardId,
        cost: &Cost,
        proposed: Option<&CostPayment>,
    ) -> CostCheck {
        match self.plan_cost(controller, source, cost, proposed) {
            Ok(_) => CostCheck::payable(),
            Err(Shortfall::Unpayable(reason)) => CostCheck::refused(reason),
            Err(Shortfall::NeedsSelection { choices, count }) => CostCheck {
                ok: true,
                reason: Some(format!("choose {} card(s) to {}", count, cost.describe())),
                requires_selection: true,
                choices,
                min: count,
                max: count,
            },
        }
    }

    /// Pay `cost` for an activation of `source`
    ///
    /// Fails with `CannotPayCost` before any mutation when the cost is not
    /// payable or still needs a selection.
    pub fn pay_cost(
        &mut self,
        controller: PlayerId,
        source: CardId,
        cost: &Cost,
        payment: Option<&CostPayment>,
    ) -> Result<()> {
        let plan = match self.plan_cost(controller, source, cost, payment) {
            Ok(plan) => plan,
            Err(Shortfall::Unpayable(reason)) => return Err(DuelError::CannotPayCost(reason)),
            Err(Shortfall::NeedsSelection { count, .. }) => {
                return Err(DuelError::CannotPayCost(format!(
                    "choose {} card(s) to {}",
                    count,
                    cost.describe()
                )))
            }
        };

        if plan.life > 0 {
            self.change_life(controller, -plan.life)?;
        }
        if plan.resources > 0 {
            self.player_mut(controller)?.resources -= plan.resources;
        }
        for (card, kind) in plan.moves {
            self.move_card(card, kind.to_zone())?;
            if kind == CostMove::Discard {
                self.record(GameEvent::Discarded {
                    player: controller,
                    card,
                });
            }
        }

        let description = cost.describe();
        game_log!(self, Verbose, "cost", "player {} pays {} for card {}", controller, description, source);
        self.record(GameEvent::CostPaid {
            player: controller,
            card: source,
            description,
        });
        Ok(())
    }
}
