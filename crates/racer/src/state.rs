use std::ops::{Index, IndexMut};

/// Number of scalars in the vehicle state.
pub const STATE_LEN: usize = 11;

/// Position of each quantity in the state vector.
///
/// Positions and angles are in SI units (m, rad); the rates are their time
/// derivatives. Angles are never wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateIndex {
    /// World x position of the center of mass.
    X = 0,
    XDot,
    /// World z position of the center of mass.
    Z,
    ZDot,
    /// Heading angle ψ.
    Psi,
    PsiDot,
    /// Left rear wheel rotation.
    ThetaL,
    /// Right rear wheel rotation.
    ThetaR,
    /// Front (steered) wheel rotation.
    ThetaF,
    /// Steer angle δ.
    Delta,
    DeltaDot,
}

impl StateIndex {
    /// Every index, in state-vector order.
    pub const ALL: [StateIndex; STATE_LEN] = [
        Self::X,
        Self::XDot,
        Self::Z,
        Self::ZDot,
        Self::Psi,
        Self::PsiDot,
        Self::ThetaL,
        Self::ThetaR,
        Self::ThetaF,
        Self::Delta,
        Self::DeltaDot,
    ];
}

/// The vehicle state vector, or its time derivative.
///
/// The same layout is used for both: a derivative holds `ẋ` in the `X` slot,
/// `ẍ` in the `XDot` slot, and so on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct State([f64; STATE_LEN]);

impl State {
    /// Returns the all-zero state: at rest at the origin, heading along +x.
    #[must_use]
    pub const fn zero() -> Self {
        Self([0.0; STATE_LEN])
    }

    /// Returns the underlying array.
    #[must_use]
    pub fn as_array(&self) -> &[f64; STATE_LEN] {
        &self.0
    }

    /// Consumes the state and returns the underlying array.
    #[must_use]
    pub fn into_array(self) -> [f64; STATE_LEN] {
        self.0
    }

    /// Returns true if every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Returns a copy with one component replaced.
    #[must_use]
    pub fn with(mut self, index: StateIndex, value: f64) -> Self {
        self[index] = value;
        self
    }

    /// Sets the x velocity in SI units (m/s).
    #[must_use]
    pub fn x_dot_si(self, x_dot: f64) -> Self {
        self.with(StateIndex::XDot, x_dot)
    }

    /// Sets the z velocity in SI units (m/s).
    #[must_use]
    pub fn z_dot_si(self, z_dot: f64) -> Self {
        self.with(StateIndex::ZDot, z_dot)
    }

    /// Sets the heading in radians.
    #[must_use]
    pub fn psi(self, psi: f64) -> Self {
        self.with(StateIndex::Psi, psi)
    }

    /// Sets the yaw rate in rad/s.
    #[must_use]
    pub fn psi_dot(self, psi_dot: f64) -> Self {
        self.with(StateIndex::PsiDot, psi_dot)
    }

    /// Sets the steer angle in radians.
    #[must_use]
    pub fn delta(self, delta: f64) -> Self {
        self.with(StateIndex::Delta, delta)
    }

    /// Sets the steer rate in rad/s.
    #[must_use]
    pub fn delta_dot(self, delta_dot: f64) -> Self {
        self.with(StateIndex::DeltaDot, delta_dot)
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self[StateIndex::X]
    }

    #[must_use]
    pub fn x_dot(&self) -> f64 {
        self[StateIndex::XDot]
    }

    #[must_use]
    pub fn z(&self) -> f64 {
        self[StateIndex::Z]
    }

    #[must_use]
    pub fn z_dot(&self) -> f64 {
        self[StateIndex::ZDot]
    }

    #[must_use]
    pub fn heading(&self) -> f64 {
        self[StateIndex::Psi]
    }

    #[must_use]
    pub fn yaw_rate(&self) -> f64 {
        self[StateIndex::PsiDot]
    }

    #[must_use]
    pub fn theta_left(&self) -> f64 {
        self[StateIndex::ThetaL]
    }

    #[must_use]
    pub fn theta_right(&self) -> f64 {
        self[StateIndex::ThetaR]
    }

    #[must_use]
    pub fn theta_front(&self) -> f64 {
        self[StateIndex::ThetaF]
    }

    #[must_use]
    pub fn steer_angle(&self) -> f64 {
        self[StateIndex::Delta]
    }

    #[must_use]
    pub fn steer_rate(&self) -> f64 {
        self[StateIndex::DeltaDot]
    }
}

impl Index<StateIndex> for State {
    type Output = f64;

    fn index(&self, index: StateIndex) -> &f64 {
        &self.0[index as usize]
    }
}

impl IndexMut<StateIndex> for State {
    fn index_mut(&mut self, index: StateIndex) -> &mut f64 {
        &mut self.0[index as usize]
    }
}

impl From<[f64; STATE_LEN]> for State {
    fn from(values: [f64; STATE_LEN]) -> Self {
        Self(values)
    }
}

impl From<State> for [f64; STATE_LEN] {
    fn from(state: State) -> Self {
        state.0
    }
}
