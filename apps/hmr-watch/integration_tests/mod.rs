mod helpers;
mod socket;
