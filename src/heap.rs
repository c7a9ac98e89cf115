// nt_sbi/src/heap.rs

//! Firmware heap.
//!
//! Registry tables, handler bindings and extension descriptors all live on
//! this heap. It is a first-fit free list behind a spin lock, installed as the
//! global allocator on bare-metal builds.

use crate::config::HEAP_ALIGN;
use core::alloc::{GlobalAlloc, Layout};
use core::ptr::{self, NonNull};
use linked_list_allocator::Heap;
use spin::Mutex;

pub struct FirmwareHeap {
    inner: Mutex<Heap>,
}

impl FirmwareHeap {
    pub const fn empty() -> Self {
        Self {
            inner: Mutex::new(Heap::empty()),
        }
    }

    /// Hands `[start, start + size)` to the heap. The start is rounded up to
    /// `HEAP_ALIGN`.
    ///
    /// # Safety
    ///
    /// The range must be valid, writable, unused by anything else for the
    /// rest of the firmware's life, and this must be called at most once.
    pub unsafe fn init(&self, start: usize, size: usize) {
        let aligned = (start + HEAP_ALIGN - 1) & !(HEAP_ALIGN - 1);
        let size = size.saturating_sub(aligned - start);
        unsafe { self.inner.lock().init(aligned as *mut u8, size) };
    }

    /// Total bytes managed.
    pub fn size(&self) -> usize {
        self.inner.lock().size()
    }

    pub fn used_space(&self) -> usize {
        self.inner.lock().used()
    }

    pub fn free_space(&self) -> usize {
        self.inner.lock().free()
    }
}

unsafe impl GlobalAlloc for FirmwareHeap {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.inner
            .lock()
            .allocate_first_fit(layout)
            .map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if let Some(ptr) = NonNull::new(ptr) {
            unsafe { self.inner.lock().deallocate(ptr, layout) };
        }
    }
}
