//! A view over player attributes stored in the narrative engine.

use skein_core::VariableBag;
use tracing::debug;

use crate::bridge::VariableBridge;

/// Player attributes whose authoritative storage is the variable bag.
///
/// Nothing is cached: every read re-queries the bag and every write goes
/// straight back to it.
#[derive(Debug)]
pub struct PlayerView<'a, B> {
    bridge: &'a mut VariableBridge<B>,
}

impl<'a, B: VariableBag> PlayerView<'a, B> {
    pub(crate) fn new(bridge: &'a mut VariableBridge<B>) -> Self {
        Self { bridge }
    }

    /// The moral cap, if one is declared and positive.
    pub fn moral_cap(&self) -> Option<i64> {
        let config = self.bridge.config();
        self.bridge
            .read_int(&config.player_set, &config.player.moral_cap)
            .filter(|cap| *cap > 0)
    }

    /// The moral value, clamped to `[-cap, cap]`.
    pub fn moral_value(&self) -> i64 {
        let config = self.bridge.config();
        let raw = self
            .bridge
            .read_int(&config.player_set, &config.player.moral_value)
            .unwrap_or(0);
        self.clamp_moral(raw)
    }

    /// Store a moral value. Returns the value actually stored.
    pub fn set_moral_value(&mut self, value: i64) -> i64 {
        let value = self.clamp_moral(value);
        let config = self.bridge.config();
        let set = config.player_set.clone();
        let name = config.player.moral_value.clone();
        self.bridge.write(&set, &name, value.into());
        debug!(moral = value, "moral value written");
        value
    }

    /// Shift the moral value. Returns the value actually stored.
    pub fn adjust_moral_value(&mut self, delta: i64) -> i64 {
        let next = self.moral_value().saturating_add(delta);
        self.set_moral_value(next)
    }

    fn clamp_moral(&self, value: i64) -> i64 {
        match self.moral_cap() {
            Some(cap) => value.clamp(-cap, cap),
            None => value,
        }
    }

    /// A skill value, zero when the skill is not declared.
    pub fn skill(&self, skill: &str) -> i64 {
        let config = self.bridge.config();
        let name = format!("{}{skill}", config.player.skill_prefix);
        self.bridge
            .read_int(&config.player_set, &name)
            .unwrap_or(0)
    }

    /// Store a skill value.
    pub fn set_skill(&mut self, skill: &str, value: i64) -> bool {
        let config = self.bridge.config();
        let set = config.player_set.clone();
        let name = format!("{}{skill}", config.player.skill_prefix);
        self.bridge.write(&set, &name, value.into())
    }

    /// Every declared skill with its value, in name order.
    pub fn skills(&self) -> Vec<(String, i64)> {
        let config = self.bridge.config();
        let prefix = &config.player.skill_prefix;
        self.bridge
            .list(&config.player_set)
            .into_iter()
            .filter(|(name, ty)| ty.is_integral() && name.starts_with(prefix.as_str()))
            .filter_map(|(name, _)| {
                let value = self.bridge.read_int(&config.player_set, &name)?;
                Some((name[prefix.len()..].to_string(), value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use skein_core::{MemoryBag, VariableBag};

    use super::*;
    use crate::config::StateConfig;

    fn bridge(cap: i64) -> VariableBridge<MemoryBag> {
        let bag = MemoryBag::new()
            .with_var("Player", "MoralValue", 0_i64)
            .with_var("Player", "MoralCap", cap)
            .with_var("Player", "Skill_Lockpicking", 2_i64)
            .with_var("Player", "Skill_Charm", 0_i64);
        VariableBridge::new(bag, StateConfig::default())
    }

    #[test]
    fn moral_value_is_clamped_to_cap() {
        let mut bridge = bridge(10);
        let mut player = PlayerView::new(&mut bridge);
        assert_eq!(player.set_moral_value(25), 10);
        assert_eq!(player.adjust_moral_value(-40), -10);
        assert_eq!(player.moral_value(), -10);
    }

    #[test]
    fn no_cap_means_no_clamp() {
        let mut bridge = bridge(0);
        let mut player = PlayerView::new(&mut bridge);
        assert_eq!(player.moral_cap(), None);
        assert_eq!(player.set_moral_value(250), 250);
    }

    #[test]
    fn reads_see_external_writes() {
        let mut bridge = bridge(10);
        bridge
            .bag_mut()
            .set("Player", "MoralValue", 7_i64.into())
            .unwrap();
        let player = PlayerView::new(&mut bridge);
        assert_eq!(player.moral_value(), 7);
    }

    #[test]
    fn skills_by_name() {
        let mut bridge = bridge(10);
        let mut player = PlayerView::new(&mut bridge);
        assert_eq!(player.skill("Lockpicking"), 2);
        assert!(player.set_skill("Charm", 3));
        assert!(!player.set_skill("Flying", 1));
        assert_eq!(player.skill("Flying"), 0);
        assert_eq!(
            player.skills(),
            vec![("Charm".to_string(), 3), ("Lockpicking".to_string(), 2)]
        );
    }
}
