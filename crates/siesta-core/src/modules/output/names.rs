//! Pattern names shared by the output grammar and the archive mapper.

pub const HEADER: &str = "header";
pub const PROGRAM_VERSION: &str = "program_version";
pub const ARCH: &str = "arch";
pub const COMPILER_VERSION: &str = "compiler_version";
pub const COMPILER_FLAGS: &str = "compiler_flags";
pub const PARALLEL: &str = "parallel";

pub const INPUT_DATA_FILE: &str = "input_data_file";
pub const DUMPED_INPUT_FILE: &str = "dumped_input_file";
pub const SIMULATION_PARAMETERS: &str = "simulation_parameters";
pub const REDATA: &str = "redata";
pub const N_NODES: &str = "n_nodes";
pub const RUN_START: &str = "run_start";
pub const RUN_END: &str = "run_end";
pub const SINGLE_POINT: &str = "single_point";
pub const GEOMETRY_OPTIMIZATION: &str = "geometry_optimization";
pub const STEP: &str = "step";

pub const NUMBER_OF_ATOMS: &str = "number_of_atoms";
pub const NSPIN: &str = "nspin";
pub const LATTICE_VECTORS: &str = "lattice_vectors";
pub const ATOMS: &str = "atoms";
pub const COORDINATES_FORMAT: &str = "coordinates_format";
pub const LABELS: &str = "labels";
pub const POSITIONS: &str = "positions";
pub const ENERGY: &str = "energy";
pub const CONTRIBUTION: &str = "contribution";
pub const SCF: &str = "scf";
pub const ENERGY_TOTAL: &str = "energy_total";
pub const FORCES: &str = "forces";
pub const ATOMIC: &str = "atomic";
pub const FERMI_ENERGY: &str = "fermi_energy";
pub const STRESS_TENSOR: &str = "stress_tensor";
pub const ELECTRIC_DIPOLE: &str = "electric_dipole";
