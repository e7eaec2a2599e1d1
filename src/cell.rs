use core::mem::MaybeUninit;

/// Storage for one table slot.
///
/// A cell does not know whether it holds a value. The table's tag array is
/// the only record of that, and every method here relies on the caller
/// having checked it.
#[repr(transparent)]
pub(crate) struct SlotCell<T> {
    value: MaybeUninit<T>,
}

impl<T> SlotCell<T> {
    /// Moves `value` into the cell.
    ///
    /// # Safety
    ///
    /// The cell must not hold a value; one that does would be leaked.
    #[inline(always)]
    pub(crate) unsafe fn construct(&mut self, value: T) -> &mut T {
        self.value.write(value)
    }

    /// Drops the value in place.
    ///
    /// # Safety
    ///
    /// The cell must hold a value. It is uninitialized afterwards.
    #[inline(always)]
    pub(crate) unsafe fn destroy(&mut self) {
        // SAFETY: Caller guarantees the cell holds a value.
        unsafe { self.value.assume_init_drop() }
    }

    /// Moves the value out, leaving the cell uninitialized.
    ///
    /// # Safety
    ///
    /// The cell must hold a value, and must be treated as empty afterwards.
    #[inline(always)]
    pub(crate) unsafe fn take(&mut self) -> T {
        // SAFETY: Caller guarantees the cell holds a value and will not read
        // it again.
        unsafe { self.value.assume_init_read() }
    }

    /// # Safety
    ///
    /// The cell must hold a value.
    #[inline(always)]
    pub(crate) unsafe fn get(&self) -> &T {
        // SAFETY: Caller guarantees the cell holds a value.
        unsafe { self.value.assume_init_ref() }
    }

    /// # Safety
    ///
    /// The cell must hold a value.
    #[inline(always)]
    pub(crate) unsafe fn get_mut(&mut self) -> &mut T {
        // SAFETY: Caller guarantees the cell holds a value.
        unsafe { self.value.assume_init_mut() }
    }
}
