//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic sysfs NUMA node-tree states
//! for testing various system shapes.

use super::filesystem::MockFs;

impl MockFs {
    /// Creates a typical two-node NUMA system.
    ///
    /// Both nodes carry a full meminfo file (including unitless
    /// `HugePages_*` fields and parenthesized field names) and a
    /// numastat file with the six standard counters.
    pub fn typical_numa_system() -> Self {
        let mut fs = Self::new();

        fs.add_node(
            0,
            "\
Node 0 MemTotal:       16308148 kB
Node 0 MemFree:         8218860 kB
Node 0 MemUsed:         8089288 kB
Node 0 Active:          4748148 kB
Node 0 Inactive:        2795772 kB
Node 0 Active(anon):    2410124 kB
Node 0 Inactive(anon):   121124 kB
Node 0 Active(file):    2338024 kB
Node 0 Inactive(file):  2674648 kB
Node 0 Unevictable:           0 kB
Node 0 Mlocked:               0 kB
Node 0 Dirty:               324 kB
Node 0 Writeback:             0 kB
Node 0 FilePages:       5343480 kB
Node 0 Mapped:           548520 kB
Node 0 AnonPages:       2417196 kB
Node 0 Shmem:            115600 kB
Node 0 KernelStack:       12016 kB
Node 0 PageTables:        30712 kB
Node 0 Slab:             512224 kB
Node 0 SReclaimable:     440180 kB
Node 0 SUnreclaim:        72044 kB
Node 0 AnonHugePages:    108544 kB
Node 0 HugePages_Total:       0
Node 0 HugePages_Free:        0
Node 0 HugePages_Surp:        0
",
            "\
numa_hit 193460335812
numa_miss 12624528
numa_foreign 59858626709
interleave_hit 63062
local_node 193454780853
other_node 18179487
",
        );

        fs.add_node(
            1,
            "\
Node 1 MemTotal:       16777216 kB
Node 1 MemFree:        10485760 kB
Node 1 MemUsed:         6291456 kB
Node 1 Active:          3145728 kB
Node 1 Inactive:        2097152 kB
Node 1 Active(anon):    1572864 kB
Node 1 Inactive(anon):   262144 kB
Node 1 Active(file):    1572864 kB
Node 1 Inactive(file):  1835008 kB
Node 1 Dirty:               128 kB
Node 1 Writeback:             0 kB
Node 1 FilePages:       3407872 kB
Node 1 AnonPages:       1835008 kB
Node 1 Slab:             262144 kB
Node 1 HugePages_Total:       0
Node 1 HugePages_Free:        0
",
            "\
numa_hit 98765432100
numa_miss 54321
numa_foreign 12624528
interleave_hit 31531
local_node 98765000000
other_node 432100
",
        );

        // Non-node entries the real tree also carries; discovery must skip them.
        fs.add_file("/sys/devices/system/node/possible", "0-1\n");
        fs.add_file("/sys/devices/system/node/online", "0-1\n");

        fs
    }

    /// Creates a single-node system, the common non-NUMA machine shape.
    pub fn single_node_system() -> Self {
        let mut fs = Self::new();

        fs.add_node(
            0,
            "\
Node 0 MemTotal:        8388608 kB
Node 0 MemFree:         4194304 kB
Node 0 MemUsed:         4194304 kB
Node 0 Active(anon):    1048576 kB
Node 0 Inactive(anon):   524288 kB
Node 0 HugePages_Total:       0
",
            "\
numa_hit 1234567890
numa_miss 0
numa_foreign 0
interleave_hit 12345
local_node 1234567890
other_node 0
",
        );

        fs.add_file("/sys/devices/system/node/possible", "0\n");
        fs.add_file("/sys/devices/system/node/online", "0\n");

        fs
    }

    /// Creates a sysfs tree whose node directory exists but holds no nodes.
    pub fn empty_node_tree() -> Self {
        let mut fs = Self::new();
        fs.add_dir("/sys/devices/system/node");
        fs
    }
}
