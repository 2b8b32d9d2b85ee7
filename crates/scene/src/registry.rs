use crate::error::SceneError;
use knockabout_kernel::BodyHandle;
use knockabout_render::RenderId;

/// A physics body and the renderable that mirrors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyRenderPair {
    pub body: BodyHandle,
    pub renderable: RenderId,
}

/// Position of a pair inside its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairIndex(pub usize);

/// Collects pairs during setup. Nothing can be added once built.
#[derive(Debug, Default)]
pub struct BodyRegistryBuilder {
    pairs: Vec<BodyRenderPair>,
    controlled: Option<PairIndex>,
}

impl BodyRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, body: BodyHandle, renderable: RenderId) -> PairIndex {
        let index = PairIndex(self.pairs.len());
        self.pairs.push(BodyRenderPair { body, renderable });
        index
    }

    /// Mark the pair at `index` as the one driven by input, replacing any
    /// earlier choice.
    pub fn control(&mut self, index: PairIndex) -> Result<(), SceneError> {
        if index.0 >= self.pairs.len() {
            return Err(SceneError::InvalidConfig(format!(
                "cannot control pair {} of {}",
                index.0,
                self.pairs.len()
            )));
        }
        self.controlled = Some(index);
        Ok(())
    }

    pub fn build(self) -> BodyRegistry {
        BodyRegistry {
            pairs: self.pairs,
            controlled: self.controlled,
        }
    }
}

/// Every simulated object that has a visual counterpart, in registration order.
#[derive(Debug, Clone)]
pub struct BodyRegistry {
    pairs: Vec<BodyRenderPair>,
    controlled: Option<PairIndex>,
}

impl BodyRegistry {
    pub fn pairs(&self) -> &[BodyRenderPair] {
        &self.pairs
    }

    pub fn get(&self, index: PairIndex) -> Option<BodyRenderPair> {
        self.pairs.get(index.0).copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The input-driven pair, if one was chosen.
    pub fn controlled(&self) -> Option<BodyRenderPair> {
        self.controlled.and_then(|i| self.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_in_order() {
        let mut b = BodyRegistryBuilder::new();
        let first = b.register(BodyHandle(1), RenderId(0));
        let second = b.register(BodyHandle(2), RenderId(1));
        assert_eq!(first, PairIndex(0));
        assert_eq!(second, PairIndex(1));

        let reg = b.build();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.pairs()[1].body, BodyHandle(2));
        assert!(reg.controlled().is_none());
    }

    #[test]
    fn controlled_pair() {
        let mut b = BodyRegistryBuilder::new();
        b.register(BodyHandle(1), RenderId(0));
        let player = b.register(BodyHandle(5), RenderId(3));
        b.control(player).unwrap();
        let reg = b.build();
        assert_eq!(
            reg.controlled(),
            Some(BodyRenderPair {
                body: BodyHandle(5),
                renderable: RenderId(3)
            })
        );
    }

    #[test]
    fn control_out_of_range() {
        let mut b = BodyRegistryBuilder::new();
        assert!(b.control(PairIndex(0)).is_err());
        assert!(b.build().is_empty());
    }
}
