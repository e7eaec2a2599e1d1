use alloc::alloc::handle_alloc_error;
use core::alloc::Layout;
use core::ptr::NonNull;

/// A source of raw memory for hash tables.
///
/// Tables own their allocator and use it for the tag and slot arrays only.
/// Allocation failure is fatal: implementations must not return on failure,
/// they should call [`handle_alloc_error`] (or abort some other way).
///
/// Allocators are compared with `PartialEq` when a table is moved to another
/// allocator: equal allocators can free each other's blocks, so the table's
/// arrays are adopted as-is instead of being copied.
pub trait Allocator: PartialEq {
    /// Allocates a block described by `layout`.
    ///
    /// `layout` always has a non-zero size.
    fn allocate(&self, layout: Layout) -> NonNull<u8>;

    /// Resizes a block, possibly moving it.
    ///
    /// The first `min(old.size(), new.size())` bytes are preserved.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator (or one that compares
    /// equal to it) for `old`, and `new` must have a non-zero size.
    unsafe fn reallocate(&self, ptr: NonNull<u8>, old: Layout, new: Layout) -> NonNull<u8> {
        let new_ptr = self.allocate(new);
        // SAFETY: Both blocks are live and at least `min(old, new)` bytes long.
        // They cannot overlap since `new_ptr` was freshly allocated.
        unsafe {
            core::ptr::copy_nonoverlapping(
                ptr.as_ptr(),
                new_ptr.as_ptr(),
                old.size().min(new.size()),
            );
            self.deallocate(ptr, old);
        }
        new_ptr
    }

    /// Frees a block.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator (or one that compares
    /// equal to it) for `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

impl<A: Allocator> Allocator for &A {
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        (**self).allocate(layout)
    }

    unsafe fn reallocate(&self, ptr: NonNull<u8>, old: Layout, new: Layout) -> NonNull<u8> {
        // SAFETY: Forwarded with the caller's guarantees.
        unsafe { (**self).reallocate(ptr, old, new) }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Forwarded with the caller's guarantees.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

/// The global heap, as registered with `#[global_allocator]`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        debug_assert!(layout.size() != 0);
        // SAFETY: Tables never request zero-sized blocks.
        let ptr = unsafe { alloc::alloc::alloc(layout) };
        match NonNull::new(ptr) {
            Some(ptr) => ptr,
            None => handle_alloc_error(layout),
        }
    }

    unsafe fn reallocate(&self, ptr: NonNull<u8>, old: Layout, new: Layout) -> NonNull<u8> {
        if new.align() > old.align() {
            let new_ptr = self.allocate(new);
            // SAFETY: Distinct live blocks, both at least `min(old, new)` bytes.
            unsafe {
                core::ptr::copy_nonoverlapping(
                    ptr.as_ptr(),
                    new_ptr.as_ptr(),
                    old.size().min(new.size()),
                );
                self.deallocate(ptr, old);
            }
            return new_ptr;
        }

        // SAFETY: The caller guarantees `ptr` was allocated with `old` by the
        // global heap; `new` is non-zero and its alignment does not exceed the
        // original one.
        let new_ptr = unsafe { alloc::alloc::realloc(ptr.as_ptr(), old, new.size()) };
        match NonNull::new(new_ptr) {
            Some(ptr) => ptr,
            None => handle_alloc_error(new),
        }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: The caller guarantees `ptr` came from this heap with `layout`.
        unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}
