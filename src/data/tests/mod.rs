mod dataset;
mod synthetic;
