//! Experience, level-ups and upgrade choices

use serde::{Deserialize, Serialize};

use super::noise::mix32;
use super::state::{EffectKind, GameEvent, GamePhase, GameState, PlayerState, exp_for_level, limits};

/// Options offered per level-up
pub const CHOICES_PER_LEVEL: usize = 3;

/// Passive gains granted by every level-up
const LEVEL_MAX_HP_GAIN: f32 = 6.0;
const LEVEL_HEAL: f32 = 12.0;
const LEVEL_ATTACK_GAIN: f32 = 1.5;

/// Upgrade kinds. The last three are skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    MaxHp,
    Attack,
    Haste,
    Swiftness,
    Armor,
    Pierce,
    Velocity,
    Magnetism,
    Recovery,
    OrbitBlade,
    AreaNova,
    SplitShot,
}

impl UpgradeKind {
    pub const STATS: [UpgradeKind; 9] = [
        UpgradeKind::MaxHp,
        UpgradeKind::Attack,
        UpgradeKind::Haste,
        UpgradeKind::Swiftness,
        UpgradeKind::Armor,
        UpgradeKind::Pierce,
        UpgradeKind::Velocity,
        UpgradeKind::Magnetism,
        UpgradeKind::Recovery,
    ];

    pub const SKILLS: [UpgradeKind; 3] =
        [UpgradeKind::OrbitBlade, UpgradeKind::AreaNova, UpgradeKind::SplitShot];

    pub fn is_skill(&self) -> bool {
        Self::SKILLS.contains(self)
    }

    /// Whether the upgrade can still change anything for this player
    pub fn available(&self, p: &PlayerState) -> bool {
        match self {
            UpgradeKind::MaxHp => p.max_hp < limits::MAX_HP.1,
            UpgradeKind::Attack => p.attack < limits::ATTACK.1,
            UpgradeKind::Haste => p.attack_interval > limits::ATTACK_INTERVAL.0,
            UpgradeKind::Swiftness => p.move_speed < limits::MOVE_SPEED.1,
            UpgradeKind::Armor => p.armor < limits::ARMOR.1,
            UpgradeKind::Pierce => p.pierce < limits::PIERCE.1,
            UpgradeKind::Velocity => p.projectile_speed < limits::PROJECTILE_SPEED.1,
            UpgradeKind::Magnetism => p.pickup_radius < limits::PICKUP_RADIUS.1,
            UpgradeKind::Recovery => true,
            UpgradeKind::OrbitBlade => p.orbit_level < limits::ORBIT_MAX,
            UpgradeKind::AreaNova => p.nova_level < limits::NOVA_MAX,
            UpgradeKind::SplitShot => p.split_level < limits::SPLIT_MAX,
        }
    }

    fn text(&self) -> ([&'static str; 2], [&'static str; 2]) {
        match self {
            UpgradeKind::MaxHp => (
                ["Vitality", "体魄"],
                ["+20 max HP and heal 20", "生命上限+20，并回复20点生命"],
            ),
            UpgradeKind::Attack => (
                ["Sharpened Edge", "锋刃"],
                ["+3 attack, then +8%", "攻击力+3，再提升8%"],
            ),
            UpgradeKind::Haste => (
                ["Quick Draw", "疾射"],
                ["Attack interval -10%", "攻击间隔-10%"],
            ),
            UpgradeKind::Swiftness => (
                ["Fleet Foot", "轻足"],
                ["+18 move speed", "移动速度+18"],
            ),
            UpgradeKind::Armor => (
                ["Iron Hide", "铁皮"],
                ["+2.5 armor", "护甲+2.5"],
            ),
            UpgradeKind::Pierce => (
                ["Piercing Shot", "穿透"],
                ["Projectiles pass through one more enemy", "弹道穿透+1"],
            ),
            UpgradeKind::Velocity => (
                ["Tailwind", "顺风"],
                ["+70 projectile speed", "弹速+70"],
            ),
            UpgradeKind::Magnetism => (
                ["Lodestone", "磁石"],
                ["+26 pickup radius", "拾取范围+26"],
            ),
            UpgradeKind::Recovery => (
                ["Second Wind", "回气"],
                ["Restore 40% HP", "回复40%生命"],
            ),
            UpgradeKind::OrbitBlade => (
                ["Orbit Blades", "环刃"],
                ["Blades circle you; more blades and reach per level", "环绕飞刃，升级增加数量与半径"],
            ),
            UpgradeKind::AreaNova => (
                ["Frost Nova", "寒霜新星"],
                ["Periodic burst damages every nearby foe", "周期性爆发，伤害周围所有敌人"],
            ),
            UpgradeKind::SplitShot => (
                ["Split Shot", "分裂箭"],
                ["Fire one extra projectile per volley", "每轮额外发射一枚弹道"],
            ),
        }
    }
}

/// English/Chinese text pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub zh: String,
}

impl LocalizedText {
    fn from_pair([en, zh]: [&'static str; 2]) -> Self {
        Self {
            en: en.to_string(),
            zh: zh.to_string(),
        }
    }
}

/// One option offered on level-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeChoice {
    pub kind: UpgradeKind,
    pub title: LocalizedText,
    pub description: LocalizedText,
}

impl From<UpgradeKind> for UpgradeChoice {
    fn from(kind: UpgradeKind) -> Self {
        let (title, description) = kind.text();
        Self {
            kind,
            title: LocalizedText::from_pair(title),
            description: LocalizedText::from_pair(description),
        }
    }
}

/// Every upgrade that would still change something
pub fn candidate_pool(player: &PlayerState) -> Vec<UpgradeKind> {
    UpgradeKind::STATS
        .iter()
        .chain(UpgradeKind::SKILLS.iter())
        .copied()
        .filter(|k| k.available(player))
        .collect()
}

/// Shuffle seed derived from the run so replays offer the same options
pub fn shuffle_seed(state: &GameState) -> u32 {
    let p = &state.world.player;
    let bucket = (state.elapsed.max(0.0) * 4.0) as u32;
    let mut h = mix32(state.seed as u32 ^ (state.seed >> 32) as u32);
    h = mix32(h ^ p.level.wrapping_mul(0x9e37_79b9));
    h = mix32(h ^ p.kills.wrapping_mul(0x85eb_ca6b));
    mix32(h ^ bucket)
}

/// In-place Fisher-Yates driven by the hash mix
pub fn shuffle<T>(items: &mut [T], seed: u32) {
    let mut s = seed;
    for i in (1..items.len()).rev() {
        s = mix32(s.wrapping_add(0x9e37_79b9));
        let j = (s % (i as u32 + 1)) as usize;
        items.swap(i, j);
    }
}

/// Build the options for one level-up.
///
/// If the pool contains a skill, at least one offered option is a skill.
pub fn generate_choices(player: &PlayerState, seed: u32) -> Vec<UpgradeChoice> {
    let mut pool = candidate_pool(player);
    shuffle(&mut pool, seed);

    let take = pool.len().min(CHOICES_PER_LEVEL);
    let mut picked: Vec<UpgradeKind> = pool[..take].to_vec();
    if take == CHOICES_PER_LEVEL && !picked.iter().any(|k| k.is_skill()) {
        if let Some(skill) = pool[take..].iter().find(|k| k.is_skill()) {
            picked[CHOICES_PER_LEVEL - 1] = *skill;
        }
    }
    picked.into_iter().map(UpgradeChoice::from).collect()
}

/// Mutate exactly the stats documented for `kind`
pub fn apply_upgrade(player: &mut PlayerState, kind: UpgradeKind) {
    match kind {
        UpgradeKind::MaxHp => {
            player.max_hp += 20.0;
            player.heal(20.0);
        }
        UpgradeKind::Attack => player.attack = (player.attack + 3.0) * 1.08,
        UpgradeKind::Haste => player.attack_interval *= 0.9,
        UpgradeKind::Swiftness => player.move_speed += 18.0,
        UpgradeKind::Armor => player.armor += 2.5,
        UpgradeKind::Pierce => player.pierce += 1,
        UpgradeKind::Velocity => player.projectile_speed += 70.0,
        UpgradeKind::Magnetism => player.pickup_radius += 26.0,
        UpgradeKind::Recovery => player.heal(player.max_hp * 0.4),
        UpgradeKind::OrbitBlade => player.orbit_level += 1,
        UpgradeKind::AreaNova => {
            if player.nova_level == 0 {
                player.nova_timer = 1.0;
            }
            player.nova_level += 1;
        }
        UpgradeKind::SplitShot => player.split_level += 1,
    }
    player.clamp();
}

/// Add experience and process any resulting level-ups
pub fn gain_exp(state: &mut GameState, amount: u32) {
    let player = &mut state.world.player;
    player.exp = player.exp.saturating_add(amount);

    let mut leveled = false;
    while player.exp >= player.exp_next {
        if player.level >= limits::LEVEL.1 {
            player.exp = player.exp_next - 1;
            break;
        }
        player.exp -= player.exp_next;
        player.level += 1;
        player.exp_next = exp_for_level(player.level);
        player.max_hp += LEVEL_MAX_HP_GAIN;
        player.attack += LEVEL_ATTACK_GAIN;
        player.clamp_stats();
        player.heal(LEVEL_HEAL);
        leveled = true;

        state.events.push(GameEvent::LevelUp { level: player.level });
        log::info!("Level up -> {}", player.level);
    }

    if !leveled {
        return;
    }
    let pos = state.world.player.pos;
    state.world.add_effect(EffectKind::LevelUp, pos, 60.0, 0.6);

    if state.phase.is_running() {
        let choices = generate_choices(&state.world.player, shuffle_seed(state));
        if !choices.is_empty() {
            state.phase = GamePhase::AwaitingUpgrade { choices };
        }
    }
}

/// Apply the option at `index` and resume. Ignored when nothing is pending
/// or the index is out of range.
pub fn choose(state: &mut GameState, index: usize) -> bool {
    let GamePhase::AwaitingUpgrade { choices } = &state.phase else {
        return false;
    };
    let Some(choice) = choices.get(index).cloned() else {
        return false;
    };

    apply_upgrade(&mut state.world.player, choice.kind);
    state.phase = GamePhase::Running;
    log::info!("Upgrade applied: {}", choice.title.en);
    state.events.push(GameEvent::UpgradeApplied { title: choice.title.en });
    true
}

/// Heuristic pick used by the smart-pick action and the autopilot
pub fn smart_pick(player: &PlayerState, choices: &[UpgradeChoice]) -> usize {
    let find = |kind: UpgradeKind| choices.iter().position(|c| c.kind == kind);

    if player.hp_fraction() < 0.35 {
        if let Some(i) = find(UpgradeKind::Recovery).or_else(|| find(UpgradeKind::MaxHp)) {
            return i;
        }
    }

    const PRIORITY: [UpgradeKind; 12] = [
        UpgradeKind::SplitShot,
        UpgradeKind::OrbitBlade,
        UpgradeKind::AreaNova,
        UpgradeKind::Attack,
        UpgradeKind::Haste,
        UpgradeKind::Pierce,
        UpgradeKind::MaxHp,
        UpgradeKind::Armor,
        UpgradeKind::Swiftness,
        UpgradeKind::Magnetism,
        UpgradeKind::Velocity,
        UpgradeKind::Recovery,
    ];
    PRIORITY.iter().find_map(|k| find(*k)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_level_up_opens_choice() {
        let mut state = GameState::new(9);
        let need = state.world.player.exp_next;
        gain_exp(&mut state, need);
        assert_eq!(state.world.player.level, 2);
        assert_eq!(state.world.player.exp, 0);
        assert_eq!(state.phase.choices().len(), CHOICES_PER_LEVEL);
    }

    #[test]
    fn test_multi_level_gain_keeps_exp_invariant() {
        let mut state = GameState::new(9);
        gain_exp(&mut state, 10_000);
        let p = &state.world.player;
        assert!(p.level > 5);
        assert!(p.exp < p.exp_next);
        assert!(p.hp <= p.max_hp);
        assert_eq!(state.phase.choices().len(), CHOICES_PER_LEVEL, "only one pending choice");
        let level_ups = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::LevelUp { .. }))
            .count();
        assert_eq!(level_ups as u32, p.level - 1);
    }

    #[test]
    fn test_multi_level_gain_conserves_exp() {
        let total = 10_000;
        let mut level = 1;
        let mut left = total;
        while left >= exp_for_level(level) {
            left -= exp_for_level(level);
            level += 1;
        }

        let mut state = GameState::new(9);
        gain_exp(&mut state, total);
        let p = &state.world.player;
        assert_eq!(p.level, level);
        assert_eq!(p.exp, left);
        assert_eq!(p.exp_next, exp_for_level(level));

        // Split across pickups lands in the same place
        let mut split = GameState::new(9);
        for chunk in [4_000, 3_500, 2_500] {
            split.phase = GamePhase::Running;
            gain_exp(&mut split, chunk);
        }
        assert_eq!(split.world.player.level, level);
        assert_eq!(split.world.player.exp, left);
    }

    #[test]
    fn test_choose_resumes_running() {
        let mut state = GameState::new(9);
        let need = state.world.player.exp_next;
        gain_exp(&mut state, need);
        let kind = state.phase.choices()[1].kind;
        assert!(choose(&mut state, 1));
        assert!(state.phase.is_running());
        assert!(!choose(&mut state, 0), "nothing pending any more");
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::UpgradeApplied { title } if *title == UpgradeChoice::from(kind).title.en)));
    }

    #[test]
    fn test_choose_out_of_range_is_ignored() {
        let mut state = GameState::new(9);
        let need = state.world.player.exp_next;
        gain_exp(&mut state, need);
        assert!(!choose(&mut state, 7));
        assert!(!state.phase.is_running());
    }

    #[test]
    fn test_apply_upgrade_targets_one_stat() {
        let mut p = PlayerState::default();
        let before = p.clone();
        apply_upgrade(&mut p, UpgradeKind::Pierce);
        assert_eq!(p.pierce, before.pierce + 1);
        assert_eq!(p.attack, before.attack);
        assert_eq!(p.move_speed, before.move_speed);

        apply_upgrade(&mut p, UpgradeKind::AreaNova);
        assert_eq!(p.nova_level, 1);
        assert!(p.nova_timer > 0.0);
    }

    #[test]
    fn test_skills_capped_independently() {
        let mut p = PlayerState::default();
        for _ in 0..10 {
            apply_upgrade(&mut p, UpgradeKind::SplitShot);
        }
        assert_eq!(p.split_level, limits::SPLIT_MAX);
        let pool = candidate_pool(&p);
        assert!(!pool.contains(&UpgradeKind::SplitShot));
        assert!(pool.contains(&UpgradeKind::OrbitBlade));
    }

    #[test]
    fn test_smart_pick_prefers_healing_when_low() {
        let mut p = PlayerState::default();
        p.hp = 10.0;
        let choices: Vec<UpgradeChoice> = [UpgradeKind::SplitShot, UpgradeKind::Recovery, UpgradeKind::Attack]
            .into_iter()
            .map(UpgradeChoice::from)
            .collect();
        assert_eq!(smart_pick(&p, &choices), 1);
        p.hp = p.max_hp;
        assert_eq!(smart_pick(&p, &choices), 0);
    }

    #[test]
    fn test_shuffle_is_deterministic() {
        let mut a: Vec<u32> = (0..12).collect();
        let mut b = a.clone();
        shuffle(&mut a, 1234);
        shuffle(&mut b, 1234);
        assert_eq!(a, b);
        let mut sorted = a.clone();
        sorted.sort();
        assert_eq!(sorted, (0..12).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn prop_skill_always_offered_when_available(
            seed in any::<u32>(),
            orbit in 0u8..=limits::ORBIT_MAX,
            nova in 0u8..=limits::NOVA_MAX,
            split in 0u8..=limits::SPLIT_MAX,
            pierce in 0u32..=limits::PIERCE.1,
        ) {
            let player = PlayerState {
                orbit_level: orbit,
                nova_level: nova,
                split_level: split,
                pierce,
                ..Default::default()
            };
            let pool = candidate_pool(&player);
            let choices = generate_choices(&player, seed);

            prop_assert_eq!(choices.len(), pool.len().min(CHOICES_PER_LEVEL));
            if pool.iter().any(|k| k.is_skill()) {
                prop_assert!(choices.iter().any(|c| c.kind.is_skill()));
            }
            for (i, a) in choices.iter().enumerate() {
                for b in &choices[i + 1..] {
                    prop_assert_ne!(a.kind, b.kind);
                }
            }
        }
    }
}
