pub mod leadsheet;
