pub mod batch;
pub mod io;
pub mod phylo;
pub mod screen;
