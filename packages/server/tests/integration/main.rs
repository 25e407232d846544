mod blocks;
mod common;
mod files;
