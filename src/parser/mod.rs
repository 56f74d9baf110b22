//! Ability text parser
//!
//! Turns a card's raw ability text into [`ParsedEffect`] descriptors. Each
//! sentence is one clause:
//!
//! ```text
//! [trigger condition:] [cost or target declaration;] body [duration]
//! ```
//!
//! The trigger part ends at the first `:` (or `,` when there is no colon), and
//! only the text before the first `;` is ever read as a cost. Text the parser
//! does not understand yields `None`; the card then simply has no mechanical
//! effect for that clause.

pub mod grammar;

use crate::core::{
    ActionKind, ActivationClass, CardCategory, CardFilter, Cost, EffectKind, ExpiryScope,
    OncePerTurn, ParsedEffect, Protection, Stat, TargetSelector, TargetSpec, TriggerCondition,
    TriggerEvent, TriggerSubject, Who,
};
use crate::zones::Zone;
use grammar::{count, level_cap, number_after, payment, phase_name, quoted, scan, stat_change};

/// All effects parsed from one card's ability text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAbility {
    pub effects: Vec<ParsedEffect>,
    /// Clauses with no mechanical meaning to the engine
    pub unrecognized: Vec<String>,
}

/// Parse a single clause
pub fn parse(raw: &str) -> Option<ParsedEffect> {
    let trimmed = raw.trim().trim_end_matches('.').trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();
    let mut effect = parse_clause(&lower)?;
    effect.text = trimmed.to_string();
    Some(effect)
}

/// Parse every clause of an ability
///
/// A trailing "You can only use this effect of "X" once per turn" sentence
/// upgrades the effects before it to hard once-per-turn.
pub fn parse_multi(raw: &str) -> ParsedAbility {
    let mut ability = ParsedAbility::default();

    for clause in split_clauses(raw) {
        let lower = clause.to_lowercase();
        if is_hard_opt_notice(&lower) {
            for effect in ability.effects.iter_mut() {
                if !effect.continuous {
                    effect.once_per_turn = OncePerTurn::Hard;
                }
            }
            continue;
        }
        match parse(clause) {
            Some(effect) => ability.effects.push(effect),
            None => ability.unrecognized.push(clause.to_string()),
        }
    }

    ability
}

/// Split on sentence ends and newlines, ignoring periods inside quotes
fn split_clauses(raw: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut in_quote = false;
    let mut start = 0;
    let bytes = raw.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => in_quote = !in_quote,
            b'\n' => {
                clauses.push(&raw[start..i]);
                start = i + 1;
            }
            b'.' if !in_quote => {
                let at_boundary = bytes.get(i + 1).map_or(true, |n| n.is_ascii_whitespace());
                if at_boundary {
                    clauses.push(&raw[start..i]);
                    start = i + 1;
                }
            }
            _ => {}
        }
    }
    clauses.push(&raw[start..]);

    clauses
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

fn is_hard_opt_notice(text: &str) -> bool {
    text.starts_with("you can only use this effect of") && text.contains("once per turn")
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

fn parse_clause(lower: &str) -> Option<ParsedEffect> {
    let mut text = lower.to_string();

    let once_per_turn = if text.contains("(hard once per turn)") {
        text = text.replace("(hard once per turn)", "");
        OncePerTurn::Hard
    } else if text.contains("once per turn") {
        for marker in ["(once per turn)", "once per turn:", "once per turn,", "once per turn"] {
            text = text.replace(marker, "");
        }
        OncePerTurn::Soft
    } else {
        OncePerTurn::Unlimited
    };

    let quick = text.contains("(quick effect)");
    if quick {
        text = text.replace("(quick effect)", "");
    }
    let text = text.trim().trim_start_matches([':', ',']).trim().to_string();

    let (trigger, rest) = split_trigger(&text)?;

    // Only the part before ';' may be a cost or a target declaration
    let (cost, declared, body) = match rest.split_once(';') {
        Some((pre, post)) => {
            let pre = pre.trim();
            if let Some(target_text) = pre.strip_prefix("target ") {
                (None, Some(parse_target_declaration(target_text)), post.trim())
            } else {
                (Some(parse_cost(pre)?), None, post.trim())
            }
        }
        None => (None, None, rest.trim()),
    };

    let mut effect = parse_body(body, declared)?;
    effect.cost = cost;
    effect.once_per_turn = once_per_turn;
    effect.activation = if let Some(condition) = trigger {
        effect.trigger = crate::core::Trigger::On(condition);
        ActivationClass::TriggerOnly
    } else if quick {
        ActivationClass::Quick
    } else if effect.continuous {
        ActivationClass::Continuous
    } else {
        ActivationClass::Ignition
    };

    Some(effect)
}

/// Separate a leading trigger condition from the rest of the clause
///
/// Returns `None` when the clause starts like a trigger but the condition is
/// not one the engine knows.
fn split_trigger(text: &str) -> Option<(Option<TriggerCondition>, &str)> {
    if let Some(rest) = text.strip_prefix("flip:") {
        let condition = TriggerCondition::new(TriggerEvent::Flipped, TriggerSubject::ThisCard);
        return Some((Some(condition), rest.trim()));
    }

    const OPENERS: [&str; 6] = [
        "when ",
        "if ",
        "during ",
        "at the start of ",
        "at the end of ",
        "each time ",
    ];
    if !OPENERS.iter().any(|o| text.starts_with(o)) {
        return Some((None, text));
    }

    let split = text.find(':').or_else(|| text.find(','))?;
    let condition = classify_trigger(&text[..split])?;
    Some((Some(condition), text[split + 1..].trim()))
}

fn classify_trigger(cond: &str) -> Option<TriggerCondition> {
    let event = if let Some(phase) = scan(cond, phase_name) {
        if cond.contains("end of") {
            TriggerEvent::PhaseEnd(phase)
        } else {
            TriggerEvent::PhaseStart(phase)
        }
    } else if cond.contains("activates") || cond.contains("is activated") {
        if cond.contains("spell") && !cond.contains("trap") {
            TriggerEvent::SpellActivated
        } else if cond.contains("trap") && !cond.contains("spell") {
            TriggerEvent::TrapActivated
        } else {
            TriggerEvent::EffectActivated
        }
    } else if cond.contains("resolves") {
        TriggerEvent::EffectResolved
    } else if cond.contains("destroyed by battle") {
        TriggerEvent::DestroyedByBattle
    } else if cond.contains("battle damage") {
        TriggerEvent::BattleDamage
    } else if contains_any(cond, &["is attacked", "targeted for an attack"]) {
        TriggerEvent::Attacked
    } else if cond.contains("declares an attack") {
        TriggerEvent::AttackDeclared
    } else if contains_any(cond, &["sent to the graveyard", "sent to the gy"]) {
        TriggerEvent::SentToGraveyard
    } else if cond.contains("destroyed") {
        TriggerEvent::Destroyed
    } else if contains_any(cond, &["flip summoned", "flip summons", "flipped"]) {
        TriggerEvent::Flipped
    } else if contains_any(cond, &["normal summoned", "normal summons"]) {
        TriggerEvent::NormalSummoned
    } else if contains_any(cond, &["special summoned", "special summons"]) {
        TriggerEvent::SpecialSummoned
    } else if contains_any(cond, &["summoned", "summons"]) {
        TriggerEvent::Summoned
    } else {
        return None;
    };

    let subject = if cond.contains("this card") {
        TriggerSubject::ThisCard
    } else if cond.contains("opponent") {
        TriggerSubject::OpponentSide
    } else if contains_any(cond, &["you control", "your "]) {
        TriggerSubject::YourSide
    } else {
        TriggerSubject::Any
    };

    Some(TriggerCondition::new(event, subject))
}

fn parse_cost(text: &str) -> Option<Cost> {
    let mut costs = Vec::new();
    for part in text.split(" and ").flat_map(|p| p.split(", ")) {
        let part = part.trim();
        let cost = if part.starts_with("discard this card") {
            Cost::DiscardSelf
        } else if part.starts_with("discard") {
            Cost::Discard {
                count: number_after(part, "discard").unwrap_or(1) as u8,
            }
        } else if let Some((amount, unit)) = scan(part, payment) {
            match unit {
                "mana" | "resources" => Cost::PayResource { amount },
                _ => Cost::PayLife { amount },
            }
        } else if part.starts_with("tribute this card") {
            Cost::TributeSelf
        } else if part.starts_with("tribute") {
            Cost::Tribute {
                count: number_after(part, "tribute").unwrap_or(1) as u8,
            }
        } else if part.starts_with("banish this card") {
            Cost::BanishSelf
        } else if part.starts_with("banish") && part.contains("graveyard") {
            Cost::Banish {
                count: number_after(part, "banish").unwrap_or(1) as u8,
            }
        } else {
            return None;
        };
        costs.push(cost);
    }

    match costs.len() {
        0 => None,
        1 => costs.pop(),
        _ => Some(Cost::Composite(costs)),
    }
}

/// Owner, zone and filter of a card phrase such as
/// `1 level 4 or lower "dragon knight" monster from your deck`
fn card_selector(phrase: &str, default_zone: Zone) -> TargetSelector {
    let owner = if contains_any(phrase, &["your opponent", "opponent's"]) {
        Who::Opponent
    } else if contains_any(phrase, &["you control", "your "]) {
        Who::You
    } else {
        Who::Either
    };

    let zone = if phrase.contains("graveyard") {
        Zone::Graveyard
    } else if phrase.contains("deck") {
        Zone::Deck
    } else if phrase.contains("hand") && !phrase.contains("to the hand") {
        Zone::Hand
    } else if phrase.contains("banished") {
        Zone::Banished
    } else if phrase.contains("spell/trap") {
        Zone::SpellTrap
    } else {
        default_zone
    };

    let category = if phrase.contains("spell/trap") {
        None
    } else if phrase.contains("monster") {
        Some(CardCategory::Monster)
    } else if phrase.contains("spell") {
        Some(CardCategory::Spell)
    } else if phrase.contains("trap") {
        Some(CardCategory::Trap)
    } else {
        None
    };

    let filter = CardFilter {
        category,
        archetype: scan(phrase, quoted).map(str::to_string),
        max_level: scan(phrase, level_cap),
    };

    TargetSelector::Card { owner, zone, filter }
}

fn parse_target_declaration(text: &str) -> TargetSpec {
    let (n, up_to) = count(text).map(|(_, c)| c).unwrap_or((1, false));
    let mut spec = TargetSpec::new(card_selector(text, Zone::Board))
        .count(n.max(1) as u8)
        .declared();
    spec.up_to = up_to;
    spec
}

/// Target spec for the object phrase following a verb ("destroy ___")
fn object_spec(phrase: &str, declared: Option<&TargetSpec>, default_zone: Zone) -> TargetSpec {
    let pronoun = ["it ", "them", "that target", "the target"]
        .iter()
        .any(|p| phrase.starts_with(p))
        || phrase == "it";
    if pronoun {
        if let Some(spec) = declared {
            return spec.clone();
        }
    }
    if phrase.starts_with("this card") {
        return TargetSpec::new(TargetSelector::ThisCard);
    }
    if phrase.starts_with("that monster") || phrase.starts_with("that card") {
        return match declared {
            Some(spec) => spec.clone(),
            None => TargetSpec::new(TargetSelector::EventCard),
        };
    }
    if let Some(rest) = phrase.strip_prefix("all ") {
        return TargetSpec::new(card_selector(rest, default_zone)).all();
    }

    let (n, up_to) = count(phrase).map(|(_, c)| c).unwrap_or((1, false));
    let mut spec = TargetSpec::new(card_selector(phrase, default_zone)).count(n.max(1) as u8);
    spec.up_to = up_to;
    spec
}

fn parse_duration(body: &str) -> Option<ExpiryScope> {
    if let Some(pos) = body.find("until") {
        let tail = &body[pos..];
        return match scan(tail, phase_name) {
            Some(phase) => Some(ExpiryScope::Phase(phase)),
            None => Some(ExpiryScope::Turn),
        };
    }
    if body.contains("this turn") {
        return Some(ExpiryScope::Turn);
    }
    None
}

/// Text following the first occurrence of `verb`
fn after<'a>(body: &'a str, verb: &str) -> &'a str {
    body.find(verb)
        .map(|pos| body[pos + verb.len()..].trim_start())
        .unwrap_or("")
}

fn parse_body(body: &str, declared: Option<TargetSpec>) -> Option<ParsedEffect> {
    let duration = parse_duration(body);

    if body.contains("cannot") {
        return parse_prohibition(body, declared, duration);
    }

    if body.starts_with("negate") || body.contains("negate the activation") {
        let effect = ParsedEffect::new(EffectKind::Negate)
            .with_target(TargetSpec::new(TargetSelector::ChainLink).declared());
        return Some(effect);
    }

    if let Some((amount, is_def)) = scan(body, stat_change) {
        let stat = if is_def { Stat::Defense } else { Stat::Attack };
        let mut effect = ParsedEffect::new(EffectKind::ModifyStat(stat)).with_value(amount);
        if let Some(rest) = body.strip_prefix("all ") {
            effect.target = Some(TargetSpec::new(card_selector(rest, Zone::Board)).all());
            effect.continuous = duration.is_none();
        } else {
            effect.target = Some(object_spec(body, declared.as_ref(), Zone::Board));
        }
        effect.duration = if effect.continuous {
            None
        } else {
            Some(duration.unwrap_or(ExpiryScope::Turn))
        };
        return Some(effect);
    }

    if contains_any(body, &["gain", "recover"]) && contains_any(body, &[" lp", "life points"]) {
        let amount = number_after(body, "gain").or_else(|| number_after(body, "recover"))?;
        let effect = ParsedEffect::new(EffectKind::Heal)
            .with_value(amount)
            .with_target(TargetSpec::new(TargetSelector::Player(Who::You)));
        return Some(effect);
    }

    if body.contains("inflict") && body.contains("damage") {
        let amount = number_after(body, "inflict")?;
        let who = if body.contains("to you") && !body.contains("to your opponent") {
            Who::You
        } else {
            Who::Opponent
        };
        let effect = ParsedEffect::new(EffectKind::Damage)
            .with_value(amount)
            .with_target(TargetSpec::new(TargetSelector::Player(who)));
        return Some(effect);
    }

    if body.contains("special summon") {
        let phrase = after(body, "special summon");
        let mut spec = object_spec(phrase, declared.as_ref(), Zone::Hand);
        if let TargetSelector::Card { filter, .. } = &mut spec.selector {
            filter.category = Some(CardCategory::Monster);
        }
        return Some(ParsedEffect::new(EffectKind::SpecialSummon).with_target(spec));
    }

    if body.starts_with("add") && body.contains("hand") {
        let phrase = after(body, "add");
        let spec = object_spec(phrase, declared.as_ref(), Zone::Deck);
        let kind = match &spec.selector {
            TargetSelector::Card {
                zone: Zone::Deck, ..
            } => EffectKind::Search,
            _ => EffectKind::ZoneMove(Zone::Hand),
        };
        return Some(ParsedEffect::new(kind).with_target(spec));
    }

    if body.contains("top") && body.contains("deck") && body.contains("graveyard") {
        let amount = number_after(body, "top").unwrap_or(1);
        let who = if body.contains("opponent") {
            Who::Opponent
        } else {
            Who::You
        };
        let effect = ParsedEffect::new(EffectKind::Mill)
            .with_value(amount)
            .with_target(TargetSpec::new(TargetSelector::Player(who)));
        return Some(effect);
    }

    if body.starts_with("draw") || body.contains(" draws ") {
        let amount = number_after(body, "draw").unwrap_or(1);
        let who = if body.contains("opponent draws") {
            Who::Opponent
        } else {
            Who::You
        };
        let effect = ParsedEffect::new(EffectKind::Draw)
            .with_value(amount)
            .with_target(TargetSpec::new(TargetSelector::Player(who)));
        return Some(effect);
    }

    if body.contains("discard") {
        let amount = number_after(body, "discard").unwrap_or(1);
        let who = if body.contains("opponent discards") {
            Who::Opponent
        } else {
            Who::You
        };
        let effect = ParsedEffect::new(EffectKind::Discard)
            .with_value(amount)
            .with_target(TargetSpec::new(TargetSelector::Player(who)));
        return Some(effect);
    }

    if body.starts_with("return") && body.contains("hand") {
        let phrase = after(body, "return");
        let spec = object_spec(phrase, declared.as_ref(), Zone::Board);
        return Some(ParsedEffect::new(EffectKind::ZoneMove(Zone::Hand)).with_target(spec));
    }

    if body.starts_with("shuffle") && body.contains("deck") {
        let phrase = after(body, "shuffle");
        let spec = object_spec(phrase, declared.as_ref(), Zone::Board);
        return Some(ParsedEffect::new(EffectKind::ZoneMove(Zone::Deck)).with_target(spec));
    }

    if body.starts_with("send") && body.contains("graveyard") {
        let phrase = after(body, "send");
        let spec = object_spec(phrase, declared.as_ref(), Zone::Board);
        return Some(ParsedEffect::new(EffectKind::ZoneMove(Zone::Graveyard)).with_target(spec));
    }

    if body.contains("destroy") {
        let phrase = after(body, "destroy");
        let spec = object_spec(phrase, declared.as_ref(), Zone::Board);
        return Some(ParsedEffect::new(EffectKind::Destroy).with_target(spec));
    }

    if body.contains("banish") {
        let phrase = after(body, "banish");
        let spec = object_spec(phrase, declared.as_ref(), Zone::Board);
        return Some(ParsedEffect::new(EffectKind::Banish).with_target(spec));
    }

    None
}

/// "cannot be destroyed ...", "cannot be targeted ...", "your opponent cannot activate ..."
fn parse_prohibition(
    body: &str,
    declared: Option<TargetSpec>,
    duration: Option<ExpiryScope>,
) -> Option<ParsedEffect> {
    let protection = if body.contains("cannot be destroyed by battle") {
        Some(Protection::BattleDestruction)
    } else if body.contains("cannot be destroyed by") {
        Some(Protection::EffectDestruction)
    } else if body.contains("cannot be targeted") {
        Some(Protection::Targeting)
    } else {
        None
    };

    if let Some(protection) = protection {
        let subject = body.split("cannot").next().unwrap_or("").trim();
        let target = if subject.starts_with("this card") || subject.is_empty() {
            TargetSpec::new(TargetSelector::ThisCard)
        } else if let Some(rest) = subject.strip_prefix("all ") {
            TargetSpec::new(card_selector(rest, Zone::Board)).all()
        } else if subject.starts_with("monsters") {
            TargetSpec::new(card_selector(subject, Zone::Board)).all()
        } else {
            object_spec(subject, declared.as_ref(), Zone::Board)
        };
        let mut effect = ParsedEffect::new(EffectKind::Protect(protection)).with_target(target);
        effect.protection = Some(protection);
        effect.continuous = duration.is_none();
        effect.duration = duration;
        return Some(effect);
    }

    let action = if body.contains("activate spell") {
        ActionKind::ActivateSpell
    } else if body.contains("activate trap") {
        ActionKind::ActivateTrap
    } else if body.contains("activate monster effects") || body.contains("activate the effects of monsters") {
        ActionKind::ActivateMonsterEffect
    } else if body.contains("cannot normal summon") {
        ActionKind::NormalSummon
    } else if body.contains("cannot special summon") {
        ActionKind::SpecialSummon
    } else if contains_any(body, &["cannot attack", "cannot declare an attack", "cannot declare attacks"]) {
        ActionKind::Attack
    } else {
        return None;
    };

    let who = if body.starts_with("you cannot") {
        Who::You
    } else if body.starts_with("neither player") || body.starts_with("players cannot") {
        Who::Either
    } else {
        Who::Opponent
    };
    let mut effect = ParsedEffect::new(EffectKind::Restrict(action))
        .with_target(TargetSpec::new(TargetSelector::Player(who)));
    effect.duration = Some(duration.unwrap_or(ExpiryScope::Turn));
    Some(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Trigger;
    use crate::game::Phase;

    #[test]
    fn test_parse_draw() {
        let effect = parse("Draw 2 cards.").unwrap();
        assert_eq!(effect.kind, EffectKind::Draw);
        assert_eq!(effect.value, Some(2));
        assert_eq!(effect.trigger, Trigger::Manual);
        assert_eq!(effect.activation, ActivationClass::Ignition);
        assert_eq!(effect.text, "Draw 2 cards");
    }

    #[test]
    fn test_unrecognized_text_is_none() {
        assert!(parse("This card is very shiny.").is_none());
        assert!(parse("").is_none());
        // Trigger-shaped but unknown condition
        assert!(parse("When the moon is full: draw 1 card.").is_none());
    }

    #[test]
    fn test_trigger_keywords() {
        let effect = parse("When this card is Normal Summoned: Draw 1 card.").unwrap();
        assert_eq!(
            effect.trigger_condition(),
            Some(TriggerCondition::new(TriggerEvent::NormalSummoned, TriggerSubject::ThisCard))
        );
        assert_eq!(effect.activation, ActivationClass::TriggerOnly);

        let effect = parse("FLIP: Destroy 1 monster on the field.").unwrap();
        assert_eq!(effect.trigger_condition().unwrap().event, TriggerEvent::Flipped);

        let effect = parse("If this card is destroyed by battle: Draw 1 card.").unwrap();
        assert_eq!(effect.trigger_condition().unwrap().event, TriggerEvent::DestroyedByBattle);

        let effect =
            parse("When this card inflicts battle damage to your opponent: Draw 1 card.").unwrap();
        assert_eq!(effect.trigger_condition().unwrap().event, TriggerEvent::BattleDamage);

        let effect = parse("When your opponent activates a Spell Card: Negate the activation.").unwrap();
        let condition = effect.trigger_condition().unwrap();
        assert_eq!(condition.event, TriggerEvent::SpellActivated);
        assert_eq!(condition.subject, TriggerSubject::OpponentSide);
    }

    #[test]
    fn test_active_summon_wording() {
        let effect = parse("When your opponent Normal Summons a monster: Destroy that monster.").unwrap();
        assert_eq!(
            effect.trigger_condition(),
            Some(TriggerCondition::new(TriggerEvent::NormalSummoned, TriggerSubject::OpponentSide))
        );
        assert_eq!(effect.kind, EffectKind::Destroy);
        assert_eq!(effect.target.as_ref().unwrap().selector, TargetSelector::EventCard);

        let effect = parse("When your opponent Special Summons a monster: Draw 1 card.").unwrap();
        assert_eq!(effect.trigger_condition().unwrap().event, TriggerEvent::SpecialSummoned);

        let effect = parse("When your opponent Flip Summons a monster: Draw 1 card.").unwrap();
        assert_eq!(effect.trigger_condition().unwrap().event, TriggerEvent::Flipped);

        let effect = parse("When your opponent Summons a monster: Inflict 300 damage to your opponent.")
            .unwrap();
        let condition = effect.trigger_condition().unwrap();
        assert_eq!(condition.event, TriggerEvent::Summoned);
        assert_eq!(condition.subject, TriggerSubject::OpponentSide);
    }

    #[test]
    fn test_phase_triggers() {
        let effect = parse("During your Standby Phase: Gain 500 LP.").unwrap();
        let condition = effect.trigger_condition().unwrap();
        assert_eq!(condition.event, TriggerEvent::PhaseStart(Phase::Standby));
        assert_eq!(condition.subject, TriggerSubject::YourSide);
        assert_eq!(effect.kind, EffectKind::Heal);

        let effect = parse("At the end of the Battle Phase: Draw 1 card.").unwrap();
        assert_eq!(
            effect.trigger_condition().unwrap().event,
            TriggerEvent::PhaseEnd(Phase::Battle)
        );
    }

    #[test]
    fn test_cost_prefix() {
        let effect = parse("Discard 1 card; draw 2 cards.").unwrap();
        assert_eq!(effect.cost, Some(Cost::Discard { count: 1 }));
        assert_eq!(effect.kind, EffectKind::Draw);

        let effect = parse("Pay 1000 LP and discard 1 card; destroy 1 monster your opponent controls.")
            .unwrap();
        assert_eq!(
            effect.cost,
            Some(Cost::Composite(vec![
                Cost::PayLife { amount: 1000 },
                Cost::Discard { count: 1 }
            ]))
        );

        let effect = parse("Pay 2 mana; draw 1 card.").unwrap();
        assert_eq!(effect.cost, Some(Cost::PayResource { amount: 2 }));

        let effect = parse("Tribute this card; special summon 1 monster from your hand.").unwrap();
        assert_eq!(effect.cost, Some(Cost::TributeSelf));

        let effect = parse("Banish 2 cards from your graveyard; draw 1 card.").unwrap();
        assert_eq!(effect.cost, Some(Cost::Banish { count: 2 }));
    }

    #[test]
    fn test_cost_words_after_separator_are_not_costs() {
        let effect = parse("Draw 1 card, then discard 1 card.").unwrap();
        assert_eq!(effect.cost, None);
        assert_eq!(effect.kind, EffectKind::Draw);
    }

    #[test]
    fn test_target_declaration() {
        let effect = parse("Target 1 monster your opponent controls; destroy it.").unwrap();
        assert_eq!(effect.kind, EffectKind::Destroy);
        let target = effect.target.unwrap();
        assert!(target.declared);
        assert_eq!(target.count, 1);
        match target.selector {
            TargetSelector::Card { owner, zone, filter } => {
                assert_eq!(owner, Who::Opponent);
                assert_eq!(zone, Zone::Board);
                assert_eq!(filter.category, Some(CardCategory::Monster));
            }
            other => panic!("unexpected selector {other:?}"),
        }
    }

    #[test]
    fn test_destroy_up_to_and_all() {
        let effect = parse("Destroy up to 2 spell/trap cards your opponent controls.").unwrap();
        let target = effect.target.unwrap();
        assert!(target.up_to);
        assert_eq!(target.count, 2);
        assert!(matches!(target.selector, TargetSelector::Card { zone: Zone::SpellTrap, .. }));

        let effect = parse("Destroy all monsters your opponent controls.").unwrap();
        assert!(effect.target.unwrap().all);
    }

    #[test]
    fn test_search_with_filter() {
        let effect =
            parse("Add 1 Level 4 or lower \"Dragon Knight\" monster from your Deck to your hand.")
                .unwrap();
        assert_eq!(effect.kind, EffectKind::Search);
        match effect.target.unwrap().selector {
            TargetSelector::Card { owner, zone, filter } => {
                assert_eq!(owner, Who::You);
                assert_eq!(zone, Zone::Deck);
                assert_eq!(filter.archetype.as_deref(), Some("dragon knight"));
                assert_eq!(filter.max_level, Some(4));
            }
            other => panic!("unexpected selector {other:?}"),
        }
    }

    #[test]
    fn test_special_summon_sources() {
        let effect = parse("Special Summon 1 monster from your Graveyard.").unwrap();
        assert_eq!(effect.kind, EffectKind::SpecialSummon);
        assert!(matches!(
            effect.target.unwrap().selector,
            TargetSelector::Card { zone: Zone::Graveyard, .. }
        ));

        let effect = parse("Special Summon this card.").unwrap();
        assert_eq!(effect.target.unwrap().selector, TargetSelector::ThisCard);
    }

    #[test]
    fn test_protection_clauses() {
        let effect = parse("This card cannot be destroyed by battle.").unwrap();
        assert_eq!(effect.kind, EffectKind::Protect(Protection::BattleDestruction));
        assert_eq!(effect.protection, Some(Protection::BattleDestruction));
        assert!(effect.continuous);
        assert_eq!(effect.activation, ActivationClass::Continuous);

        let effect = parse("This card cannot be destroyed by card effects.").unwrap();
        assert_eq!(effect.protection, Some(Protection::EffectDestruction));

        let effect = parse("This card cannot be targeted by your opponent's card effects.").unwrap();
        assert_eq!(effect.protection, Some(Protection::Targeting));
    }

    #[test]
    fn test_continuous_stat_modifier() {
        let effect = parse("All \"Dragon Knight\" monsters you control gain 300 ATK.").unwrap();
        assert_eq!(effect.kind, EffectKind::ModifyStat(Stat::Attack));
        assert_eq!(effect.value, Some(300));
        assert!(effect.continuous);
        let target = effect.target.unwrap();
        assert!(target.all);
        match target.selector {
            TargetSelector::Card { owner, filter, .. } => {
                assert_eq!(owner, Who::You);
                assert_eq!(filter.archetype.as_deref(), Some("dragon knight"));
            }
            other => panic!("unexpected selector {other:?}"),
        }
    }

    #[test]
    fn test_temporary_stat_modifier() {
        let effect = parse("Target 1 monster you control; it gains 500 ATK until the end of this turn.")
            .unwrap();
        assert_eq!(effect.kind, EffectKind::ModifyStat(Stat::Attack));
        assert!(!effect.continuous);
        assert_eq!(effect.duration, Some(ExpiryScope::Turn));
        assert!(effect.target.unwrap().declared);

        let effect = parse("This card loses 400 DEF until the end of the Battle Phase.").unwrap();
        assert_eq!(effect.value, Some(-400));
        assert_eq!(effect.duration, Some(ExpiryScope::Phase(Phase::Battle)));
    }

    #[test]
    fn test_restriction() {
        let effect = parse("Your opponent cannot activate Spell Cards until the end of this turn.")
            .unwrap();
        assert_eq!(effect.kind, EffectKind::Restrict(ActionKind::ActivateSpell));
        assert_eq!(effect.duration, Some(ExpiryScope::Turn));
        assert_eq!(
            effect.target.unwrap().selector,
            TargetSelector::Player(Who::Opponent)
        );
    }

    #[test]
    fn test_misc_bodies() {
        assert_eq!(parse("Inflict 800 damage to your opponent.").unwrap().kind, EffectKind::Damage);
        assert_eq!(
            parse("Send the top 3 cards of your opponent's Deck to the Graveyard.").unwrap().value,
            Some(3)
        );
        assert_eq!(
            parse("Return 1 monster on the field to the hand.").unwrap().kind,
            EffectKind::ZoneMove(Zone::Hand)
        );
        assert_eq!(
            parse("Banish 1 card from your opponent's Graveyard.").unwrap().kind,
            EffectKind::Banish
        );
        assert_eq!(
            parse("Your opponent discards 1 card.").unwrap().kind,
            EffectKind::Discard
        );
    }

    #[test]
    fn test_opt_markers() {
        let effect = parse("Once per turn: Draw 1 card.").unwrap();
        assert_eq!(effect.once_per_turn, OncePerTurn::Soft);

        let effect = parse("(Quick Effect) (Hard once per turn): Inflict 500 damage to your opponent.")
            .unwrap();
        assert_eq!(effect.once_per_turn, OncePerTurn::Hard);
        assert_eq!(effect.activation, ActivationClass::Quick);
    }

    #[test]
    fn test_parse_multi_applies_hard_notice() {
        let ability = parse_multi(
            "Draw 1 card. Inflict 300 damage to your opponent. Flavor text here. \
             You can only use this effect of \"Pot of Plenty\" once per turn.",
        );
        assert_eq!(ability.effects.len(), 2);
        assert!(ability.effects.iter().all(|e| e.once_per_turn == OncePerTurn::Hard));
        assert_eq!(ability.unrecognized, vec!["Flavor text here".to_string()]);
    }

    #[test]
    fn test_split_clauses_ignores_quoted_periods() {
        let clauses = split_clauses("Add 1 \"Dr. Gear\" monster from your deck to your hand.\nDraw 1 card.");
        assert_eq!(clauses.len(), 2);
        assert!(clauses[0].contains("Dr. Gear"));
    }
}
