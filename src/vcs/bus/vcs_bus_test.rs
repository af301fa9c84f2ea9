#[cfg(test)]
mod test {
    use crate::vcs::bus::CpuBusInterface;
    use crate::vcs::bus::consts::BANK_SIZE;
    use crate::vcs::bus::device::AccessFlags;
    use crate::vcs::bus::vcs_bus::VcsBus;
    use crate::vcs::cartridge::rom::Rom;
    use crate::vcs::serializer::Serializer;
    use crate::vcs::settings::Settings;

    fn f6sc_image() -> Vec<u8> {
        let mut image = vec![0u8; 4 * BANK_SIZE];
        for bank in 0..4 {
            image[bank * BANK_SIZE + 0x200] = 0xA0 + bank as u8;
        }
        image
    }

    fn bus_for(image: Vec<u8>, settings: &Settings) -> VcsBus {
        let _ = env_logger::builder().is_test(true).try_init();
        let cart = Rom::new(image).unwrap().into_cartridge(None, settings).unwrap();
        VcsBus::new(cart, settings)
    }

    #[test]
    fn test_cpu_sees_banks_through_bus() {
        let mut bus = bus_for(f6sc_image(), &Settings::deterministic(3));
        assert_eq!(bus.cartridge().name(), "F6SC");
        assert_eq!(bus.cartridge().bank(), 0);

        assert!(bus.select_bank(2));
        assert_eq!(bus.cpu_bus_read(0x1200), 0xA2);

        bus.cpu_bus_write(0x1FF9, 0);
        assert_eq!(bus.cartridge().bank(), 3);
        assert_eq!(bus.cpu_bus_read(0x1200), 0xA3);

        // 13-bit address bus: $F200 is the same cell as $1200
        assert_eq!(bus.cpu_bus_read(0xF200), 0xA3);
    }

    #[test]
    fn test_superchip_ram_through_cpu_interface() {
        let mut bus = bus_for(f6sc_image(), &Settings::deterministic(3));

        bus.cpu_bus_write(0x1042, 0x99);
        assert_eq!(bus.cpu_bus_read(0x10C2), 0x99);
        assert_eq!(bus.cartridge().internal_ram_value(0x42), Some(0x99));
    }

    #[test]
    fn test_below_cartridge_reads_float() {
        let mut bus = bus_for(f6sc_image(), &Settings::deterministic(3));
        bus.select_bank(1);

        let value = bus.cpu_bus_read(0x1200);
        assert_eq!(bus.cpu_bus_read(0x0080), value);

        bus.cpu_bus_write(0x0080, 0x3C);
        assert_eq!(bus.cpu_bus_read(0x0280), 0x3C);
    }

    #[test]
    fn test_no_address_panics() {
        let mut bus = bus_for(f6sc_image(), &Settings::default());
        for addr in 0..=u16::MAX {
            bus.cpu_bus_read(addr);
        }
        assert!(bus.cartridge().bank() < 4);
    }

    #[test]
    fn test_debug_peek_leaves_data_bus_alone() {
        let mut bus = bus_for(f6sc_image(), &Settings::deterministic(3));
        bus.poke(0x1300, 0x5A);

        bus.select_bank(2);
        assert_eq!(bus.debug_peek(0x1200), 0xA2);
        assert_eq!(bus.system().get_data_bus_state(0xFF), 0x5A);
        assert_eq!(bus.peek(0x0000), 0x5A);
    }

    #[test]
    fn test_debug_peek_leaves_ram_and_bank_alone() {
        let mut bus = bus_for(f6sc_image(), &Settings::deterministic(3));
        bus.select_bank(1);
        bus.poke(0x1005, 0x42);
        bus.poke(0x1300, 0x77);

        // Write port: the floating bus comes back but is not stored
        assert_eq!(bus.debug_peek(0x1005), 0x77);
        assert_eq!(bus.cartridge().internal_ram_value(5), Some(0x42));
        assert!(bus.cartridge_mut().take_ram_read_accesses().is_empty());

        // Hot-spot for bank 2
        bus.debug_peek(0x1FF8);
        assert_eq!(bus.cartridge().bank(), 1);
        assert!(!bus.cartridge().bank_locked());

        // A plain read still switches
        bus.peek(0x1FF8);
        assert_eq!(bus.cartridge().bank(), 2);
    }

    #[test]
    fn test_debug_peek_keeps_an_existing_lock() {
        let mut bus = bus_for(f6sc_image(), &Settings::deterministic(3));
        bus.cartridge_mut().lock_bank();

        bus.debug_peek(0x1FF9);
        assert!(bus.cartridge().bank_locked());
        assert_eq!(bus.cartridge().bank(), 0);
    }

    #[test]
    fn test_peek_tagged_marks_code() {
        let mut bus = bus_for(f6sc_image(), &Settings::deterministic(3));
        bus.peek_tagged(0x1234, AccessFlags::CODE | AccessFlags::REFERENCED);

        let tag = bus.cartridge().code_access(0x1234);
        assert_eq!(tag, Some((AccessFlags::CODE | AccessFlags::REFERENCED).bits()));
        assert_eq!(bus.cartridge().code_access(0x1235), Some(0));
    }

    #[test]
    fn test_patch_through_bus() {
        let mut bus = bus_for(f6sc_image(), &Settings::deterministic(3));
        bus.cartridge_mut().bank_changed();

        assert!(bus.patch(0x1456, 0x77));
        assert_eq!(bus.peek(0x1456), 0x77);
        assert!(bus.cartridge_mut().bank_changed());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut bus = bus_for(f6sc_image(), &Settings::deterministic(3));
        bus.select_bank(3);
        for i in 0..128u16 {
            bus.poke(0x1000 + i, i as u8 ^ 0x5A);
        }
        bus.peek(0x1200);

        let mut out = Serializer::new();
        assert!(bus.save_state(&mut out));

        bus.select_bank(0);
        bus.poke(0x1000, 0xFF);

        let mut input = Serializer::from_bytes(out.into_bytes());
        assert!(bus.load_state(&mut input));
        assert_eq!(bus.cartridge().bank(), 3);
        assert_eq!(bus.system().get_data_bus_state(0xFF), 0xA3);
        for i in 0..128u16 {
            assert_eq!(bus.cartridge().internal_ram_value(i as usize), Some(i as u8 ^ 0x5A));
        }
        assert_eq!(bus.peek(0x1200), 0xA3);
    }

    #[test]
    fn test_snapshot_from_other_scheme_is_refused() {
        let mut f8sc = bus_for(vec![0u8; 2 * BANK_SIZE], &Settings::deterministic(3));
        assert_eq!(f8sc.cartridge().name(), "F8SC");
        f8sc.select_bank(1);
        let mut out = Serializer::new();
        assert!(f8sc.save_state(&mut out));

        let mut bus = bus_for(f6sc_image(), &Settings::deterministic(3));
        bus.select_bank(2);
        let mut input = Serializer::from_bytes(out.into_bytes());
        assert!(!bus.load_state(&mut input));
        assert_eq!(bus.cartridge().bank(), 2);
    }

    #[test]
    fn test_garbage_snapshot_is_refused() {
        let mut bus = bus_for(f6sc_image(), &Settings::deterministic(3));

        let mut input = Serializer::from_bytes(vec![0x01, 0x02, 0x03]);
        assert!(!bus.load_state(&mut input));

        let mut wrong = Serializer::new();
        wrong.put_string("NOTACART").unwrap();
        wrong.put_byte(1).unwrap();
        let mut input = Serializer::from_bytes(wrong.into_bytes());
        assert!(!bus.load_state(&mut input));
    }

    #[test]
    fn test_truncated_snapshot_keeps_machine_state() {
        let mut bus = bus_for(f6sc_image(), &Settings::deterministic(3));
        bus.select_bank(1);
        bus.poke(0x1300, 0x11);
        let mut out = Serializer::new();
        assert!(bus.save_state(&mut out));

        bus.select_bank(2);
        bus.poke(0x1300, 0x22);
        let mut bytes = out.into_bytes();
        bytes.truncate(bytes.len() - 10);

        let mut input = Serializer::from_bytes(bytes);
        assert!(!bus.load_state(&mut input));
        assert_eq!(bus.cartridge().bank(), 2);
        assert_eq!(bus.system().get_data_bus_state(0xFF), 0x22);
    }

    #[test]
    fn test_seeded_reset_is_reproducible() {
        let settings = Settings {
            seed: Some(0x2600),
            ..Settings::default()
        };
        let mut a = bus_for(f6sc_image(), &settings);
        let mut b = bus_for(f6sc_image(), &settings);
        assert_eq!(a.cartridge().bank(), b.cartridge().bank());
        assert_eq!(a.system_mut().random().initial_seed(), 0x2600);

        a.reset();
        b.reset();
        assert_eq!(a.cartridge().bank(), b.cartridge().bank());
        for i in 0..128 {
            assert_eq!(
                a.cartridge().internal_ram_value(i),
                b.cartridge().internal_ram_value(i)
            );
        }
    }

    #[test]
    fn test_plain_4k_cart_on_bus() {
        let mut image = vec![0u8; BANK_SIZE];
        image[0xFFC] = 0x00;
        image[0xFFD] = 0xF0;
        let mut bus = bus_for(image, &Settings::deterministic(3));
        assert_eq!(bus.cartridge().name(), "4K");

        assert_eq!(bus.cpu_bus_read(0x1FFD), 0xF0);
        assert!(!bus.select_bank(1));

        let mut out = Serializer::new();
        assert!(bus.save_state(&mut out));
        let mut input = Serializer::from_bytes(out.into_bytes());
        assert!(bus.load_state(&mut input));
    }
}
