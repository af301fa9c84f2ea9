// The 6507 only brings out 13 address lines
pub const ADDRESS_MASK: u16 = 0x1FFF;

pub const PAGE_SHIFT: u16 = 6;
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;
pub const PAGE_MASK: u16 = (PAGE_SIZE - 1) as u16;
pub const NUM_PAGES: usize = (ADDRESS_MASK as usize + 1) >> PAGE_SHIFT;

pub const CART_START: u16 = 0x1000;
pub const CART_END: u16 = 0x1FFF;
pub const CART_WINDOW_MASK: u16 = 0x0FFF;

pub const BANK_SHIFT: u16 = 12;
pub const BANK_SIZE: usize = 1 << BANK_SHIFT;
