use bitflags::bitflags;

bitflags! {
    /// Render state for pieces with no door/wall semantics.
    ///
    /// Bit 0 is the uniform "render in the default map view" signal across
    /// all three masks; the remaining bits are independent predicates for
    /// diagnostic and selective views.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BaseMask: u8 {
        const VISIBLE = 1;
    }
}

bitflags! {
    /// Render state for wall pieces
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WallMask: u8 {
        const VISIBLE = 1;
        const NORMAL = 2;
        const DESTROYED = 16;
    }
}

bitflags! {
    /// Render state for door pieces
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DoorMask: u8 {
        const VISIBLE = 1;
        const OPEN = 2;
        const CLOSED = 4;
        /// Wall piece present but hidden behind an active door
        const WALL_HIDDEN = 8;
        const RUINS = 16;
    }
}
